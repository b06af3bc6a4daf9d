use std::path::PathBuf;
use thiserror::Error;

use crate::geometry::BoundingBox;

/// Main error type for the card-normalize library.
#[derive(Error, Debug)]
pub enum Error {
    /// The raster has a zero width or height.
    #[error("empty raster {width}x{height}")]
    EmptyInput { width: u32, height: u32 },

    /// Pixel data is not tightly packed 8-bit RGBA.
    #[error("unsupported channel layout: expected {expected} bytes for RGBA8, got {actual}")]
    UnsupportedChannelLayout { expected: usize, actual: usize },

    /// The crop box is inverted, empty, or outside the source raster.
    #[error("degenerate boundary {bounds:?} for a {width}x{height} raster")]
    DegenerateBoundary {
        bounds: BoundingBox,
        width: u32,
        height: u32,
    },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Failed to decode the input image.
    #[error("failed to decode image: {source}")]
    Decode {
        #[source]
        source: image::ImageError,
    },

    /// Failed to open an image file.
    #[error("failed to open image {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to encode the output raster.
    #[error("failed to encode image: {source}")]
    Encode {
        #[source]
        source: image::ImageError,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for card-normalize operations.
pub type Result<T> = std::result::Result<T, Error>;
