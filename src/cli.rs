use clap::Parser;
use std::path::{Path, PathBuf};

use crate::codec::JPEG_QUALITY;
use crate::detection::{BOUNDARY_PADDING, EDGE_THRESHOLD};
use crate::geometry::{CardRatio, CropPolicy};
use crate::pipeline::{NormalizeConfig, OUTPUT_HEIGHT, OUTPUT_WIDTH};
use crate::transform::{BRIGHTNESS, CONTRAST};

#[derive(Parser, Debug)]
#[command(name = "card-normalize")]
#[command(version, about = "Locate a photographed ID card and re-render it at a canonical size")]
pub struct Cli {
    /// Photo of the card front
    #[arg(required = true)]
    pub front: PathBuf,

    /// Photo of the card back, processed alongside the front
    #[arg(short, long)]
    pub back: Option<PathBuf>,

    /// Output path for the front [default: front_card.jpg]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output path for the back [default: back_card.jpg]
    #[arg(long)]
    pub back_output: Option<PathBuf>,

    /// Card aspect ratio as width:height (e.g., "54:85")
    #[arg(short, long, default_value = "54:85", value_parser = parse_ratio)]
    pub ratio: CardRatio,

    /// Output width in pixels
    #[arg(long, default_value_t = OUTPUT_WIDTH)]
    pub width: u32,

    /// Output height in pixels
    #[arg(long, default_value_t = OUTPUT_HEIGHT)]
    pub height: u32,

    /// Margin added around the detected card
    #[arg(long, default_value_t = BOUNDARY_PADDING)]
    pub padding: u32,

    /// Neighbour difference sum above which a pixel counts as an edge
    #[arg(long, default_value_t = EDGE_THRESHOLD)]
    pub threshold: u32,

    /// JPEG quality (1-100)
    #[arg(short, long, default_value_t = JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Shrink the crop to the card ratio instead of stretching it
    #[arg(long)]
    pub constrain_aspect: bool,

    /// Print data URIs to stdout instead of writing files
    #[arg(long)]
    pub data_uri: bool,

    /// Show detection details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.front))
    }

    pub fn back_output_path(&self, back: &Path) -> PathBuf {
        self.back_output
            .clone()
            .unwrap_or_else(|| default_output(back))
    }

    pub fn config(&self) -> NormalizeConfig {
        NormalizeConfig {
            output_width: self.width,
            output_height: self.height,
            ratio: self.ratio,
            edge_threshold: self.threshold,
            padding: self.padding,
            contrast: CONTRAST,
            brightness: BRIGHTNESS,
            crop_policy: if self.constrain_aspect {
                CropPolicy::ConstrainAspect
            } else {
                CropPolicy::Stretch
            },
        }
    }
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{}_card.jpg", stem))
}

fn parse_ratio(s: &str) -> Result<CardRatio, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid ratio format '{}', expected W:H", s));
    }

    let horizontal: f64 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width value: {}", parts[0]))?;
    let vertical: f64 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height value: {}", parts[1]))?;

    if !(horizontal > 0.0 && vertical > 0.0 && horizontal.is_finite() && vertical.is_finite()) {
        return Err("Ratio values must be positive".to_string());
    }

    Ok(CardRatio::new(horizontal, vertical))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ratio() {
        assert_eq!(parse_ratio("54:85").unwrap(), CardRatio::new(54.0, 85.0));
        assert!(parse_ratio("54x85").is_err());
        assert!(parse_ratio("0:1").is_err());
        assert!(parse_ratio("a:1").is_err());
    }

    #[test]
    fn test_defaults_match_config() {
        let cli = Cli::parse_from(["card-normalize", "photos/front.png"]);
        assert_eq!(cli.config(), NormalizeConfig::default());
        assert_eq!(cli.output_path(), PathBuf::from("photos/front_card.jpg"));
        assert_eq!(cli.quality, 95);
    }

    #[test]
    fn test_back_and_policy() {
        let cli = Cli::parse_from([
            "card-normalize",
            "front.png",
            "--back",
            "back.heic",
            "--constrain-aspect",
        ]);
        let back = cli.back.clone().unwrap();
        assert_eq!(cli.back_output_path(&back), PathBuf::from("back_card.jpg"));
        assert_eq!(cli.config().crop_policy, CropPolicy::ConstrainAspect);
    }
}
