//! Handscribe style extraction
//!
//! Turns a handful of handwriting sample images into one [`StyleProfile`].
//! Each sample goes through a vision encoder, and the profile embedding is the
//! element-wise mean of the per-sample vectors. Averaging the alphabet,
//! numbers and symbols sheets smooths out per-sheet noise, and the profile
//! stays the same size however many samples come in.
//!
//! The encoder itself is an external capability. Two modes ship here:
//!
//! - **Stub mode** - deterministic vectors hashed from the pixels. Good for
//!   development and tests, useless for real styling.
//! - **API mode** - POST the samples to a feature-extraction endpoint and read
//!   the vectors back.
//!
//! Nothing in this crate persists anything; callers hand the profile to a
//! [`profile::ProfileStore`].
//!
//! ```no_run
//! use style::{EncoderConfig, StyleExtractor};
//!
//! # async fn run() -> Result<(), style::AnalysisError> {
//! let extractor = StyleExtractor::new(EncoderConfig::default().build()?);
//! let profile = extractor
//!     .extract(&["alphabet.png", "numbers.png", "symbols.png"])
//!     .await?;
//! assert_eq!(profile.dimension(), 768);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;

mod api;
mod encoder;
mod extract;
mod mean;
mod stub;

pub use crate::api::ApiEncoder;
pub use crate::config::EncoderConfig;
pub use crate::encoder::StyleEncoder;
pub use crate::error::AnalysisError;
pub use crate::extract::{load_samples, StyleExtractor};
pub use crate::mean::mean_embedding;
pub use crate::stub::StubEncoder;

pub use image::RgbImage;
pub use profile::StyleProfile;
