use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use image::RgbaImage;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_normalize::{
    encode_jpeg, normalize_card, normalize_pair, open_image, to_data_uri, Cli, JPEG_MIME,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("card_normalize={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(err) = run(&cli) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn load(path: &Path) -> Result<RgbaImage> {
    let img = open_image(path).with_context(|| format!("Failed to load image: {:?}", path))?;
    info!("Loaded image: {:?} ({}x{})", path, img.width(), img.height());
    Ok(img)
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config();
    config.validate().context("Invalid normalization settings")?;

    debug!(
        "Target: {}x{}, card ratio {}:{}, {:?}",
        config.output_width,
        config.output_height,
        cli.ratio.horizontal,
        cli.ratio.vertical,
        config.crop_policy
    );

    let front = load(&cli.front)?;

    let mut outputs = Vec::with_capacity(2);
    match &cli.back {
        Some(back_path) => {
            let back = load(back_path)?;
            let (front_card, back_card) = normalize_pair(&front, &back, &config);
            outputs.push((
                front_card.context("Failed to normalize front image")?,
                cli.output_path(),
            ));
            outputs.push((
                back_card.context("Failed to normalize back image")?,
                cli.back_output_path(back_path),
            ));
        }
        None => {
            let card = normalize_card(&front, &config).context("Failed to normalize image")?;
            outputs.push((card, cli.output_path()));
        }
    }

    for (card, output_path) in &outputs {
        let bytes = encode_jpeg(card, cli.quality).context("Failed to encode output")?;

        if cli.data_uri {
            println!("{}", to_data_uri(&bytes, JPEG_MIME));
            continue;
        }

        std::fs::write(output_path, &bytes)
            .with_context(|| format!("Failed to save output: {:?}", output_path))?;
        info!(
            "Saved card: {:?} ({}x{}, {} bytes)",
            output_path,
            card.width(),
            card.height(),
            bytes.len()
        );
    }

    Ok(())
}
