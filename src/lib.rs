//! Locate a photographed ID card and re-render it into a fixed-size raster.
//!
//! ```no_run
//! use card_normalize::{normalize_card, open_image, NormalizeConfig};
//!
//! # fn main() -> card_normalize::Result<()> {
//! let photo = open_image("front.jpg")?;
//! let card = normalize_card(&photo, &NormalizeConfig::default())?;
//! assert_eq!(card.dimensions(), (654, 1040));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod codec;
pub mod detection;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod transform;

pub use cli::Cli;
pub use codec::{decode_image, encode_jpeg, open_image, raster_from_rgba, to_data_uri, JPEG_MIME};
pub use detection::{build_edge_map, locate_boundary, EdgeMap};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, CardRatio, CropPolicy};
pub use pipeline::{normalize_card, normalize_pair, NormalizeConfig};
pub use transform::{normalize, Tone};
