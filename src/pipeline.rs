use image::RgbaImage;
use tracing::{debug, warn};

use crate::detection::{
    build_edge_map_with_threshold, locate_boundary, BOUNDARY_PADDING, EDGE_THRESHOLD,
};
use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, CardRatio, CropPolicy};
use crate::transform::{normalize_with_tone, Tone, BRIGHTNESS, CONTRAST};

/// Output width in pixels, about three times an ID-1 card's width in millimetres
pub const OUTPUT_WIDTH: u32 = 654;

/// Output height in pixels
pub const OUTPUT_HEIGHT: u32 = 1040;

/// Configuration for a normalization run
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeConfig {
    pub output_width: u32,
    pub output_height: u32,
    /// Canonical card ratio, applied only under [`CropPolicy::ConstrainAspect`]
    pub ratio: CardRatio,
    pub edge_threshold: u32,
    pub padding: u32,
    pub contrast: f64,
    pub brightness: f64,
    pub crop_policy: CropPolicy,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            output_width: OUTPUT_WIDTH,
            output_height: OUTPUT_HEIGHT,
            ratio: CardRatio::default(),
            edge_threshold: EDGE_THRESHOLD,
            padding: BOUNDARY_PADDING,
            contrast: CONTRAST,
            brightness: BRIGHTNESS,
            crop_policy: CropPolicy::default(),
        }
    }
}

impl NormalizeConfig {
    /// Check that every value can produce an output raster.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.output_width == 0 || self.output_height == 0 {
            return Err(invalid(
                "output size",
                format!("{}x{} has no pixels", self.output_width, self.output_height),
            ));
        }

        let ratio = self.ratio.value();
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(invalid("ratio", "values must be positive".to_string()));
        }

        for (name, value) in [("contrast", self.contrast), ("brightness", self.brightness)] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(name, format!("{} is not a usable multiplier", value)));
            }
        }

        Ok(())
    }

    fn tone(&self) -> Tone {
        Tone {
            contrast: self.contrast,
            brightness: self.brightness,
        }
    }
}

fn invalid(name: &str, reason: String) -> Error {
    Error::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}

/// Locate the card in `img` and re-render it at the configured size.
///
/// When no edge is found, or the edges enclose no area (a single row or
/// column with zero padding), the whole frame is used as the crop region.
///
/// # Errors
///
/// Returns an error for an empty raster or an invalid configuration.
pub fn normalize_card(img: &RgbaImage, config: &NormalizeConfig) -> Result<RgbaImage> {
    config.validate()?;

    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::EmptyInput { width, height });
    }

    let edges = build_edge_map_with_threshold(img, config.edge_threshold);
    let located = locate_boundary(&edges, config.padding);
    drop(edges);

    let bounds = if located.is_inverted() {
        warn!(width, height, "No card boundary found, using the whole frame");
        BoundingBox::full_frame(width, height)
    } else if located.is_degenerate() {
        // With little or no padding a single row or column of edges spans no area
        warn!(?located, "Card boundary encloses no area, using the whole frame");
        BoundingBox::full_frame(width, height)
    } else {
        located
    };

    debug!(?bounds, "Crop bounds");

    normalize_with_tone(
        img,
        &bounds,
        config.output_width,
        config.output_height,
        &config.ratio,
        config.crop_policy,
        &config.tone(),
    )
}

/// Normalize the front and back of a card concurrently.
pub fn normalize_pair(
    front: &RgbaImage,
    back: &RgbaImage,
    config: &NormalizeConfig,
) -> (Result<RgbaImage>, Result<RgbaImage>) {
    rayon::join(
        || normalize_card(front, config),
        || normalize_card(back, config),
    )
}
