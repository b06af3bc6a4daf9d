use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageReader, RgbaImage};
use tracing::debug;

use crate::error::{Error, Result};

/// Quality used for the exported card, matching a 0.95 canvas export
pub const JPEG_QUALITY: u8 = 95;

pub const JPEG_MIME: &str = "image/jpeg";

/// Wrap tightly packed RGBA8 bytes in a raster.
///
/// # Errors
///
/// Rejects zero dimensions and byte counts other than `width * height * 4`.
pub fn raster_from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<RgbaImage> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyInput { width, height });
    }

    let expected = width as usize * height as usize * 4;
    let actual = data.len();
    RgbaImage::from_raw(width, height, data)
        .filter(|_| actual == expected)
        .ok_or(Error::UnsupportedChannelLayout { expected, actual })
}

/// Convert a decoded image to RGBA8, rejecting empty rasters
fn into_raster(img: DynamicImage) -> Result<RgbaImage> {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(Error::EmptyInput { width, height });
    }

    debug!(width, height, color = ?img.color(), "Decoded source image");
    Ok(img.into_rgba8())
}

/// Decode an encoded image (JPEG, PNG, ...) into an RGBA8 raster.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    let img = image::load_from_memory(bytes).map_err(|source| Error::Decode { source })?;
    into_raster(img)
}

/// Open and decode an image file into an RGBA8 raster.
pub fn open_image<P: AsRef<Path>>(path: P) -> Result<RgbaImage> {
    let path = path.as_ref();

    let img = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

    into_raster(img)
}

/// Encode a raster as JPEG. Alpha is dropped.
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> Result<Vec<u8>> {
    if !(1..=100).contains(&quality) {
        return Err(Error::InvalidParameter {
            name: "quality".to_string(),
            reason: format!("{} is outside 1-100", quality),
        });
    }

    let rgb = DynamicImage::ImageRgba8(img.clone()).into_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality)
        .encode_image(&rgb)
        .map_err(|source| Error::Encode { source })?;

    Ok(bytes)
}

/// Format encoded bytes as a `data:` URI
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}
