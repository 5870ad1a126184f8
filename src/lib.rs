//! Workspace umbrella crate for Handscribe.
//!
//! A user submits a few scans of their handwriting; the [`Pipeline`] turns
//! them into a [`StyleProfile`] and later renders arbitrary text in that
//! style. The stages live in their own crates and are re-exported here:
//!
//! - [`profile`]: the profile type and its per-user store;
//! - [`style`]: sample decoding and the vision-encoder capability;
//! - [`prompt`]: quality tiers and prompt templates;
//! - [`generation`]: the generation capability and its strategies.
//!
//! ```no_run
//! use handscribe::{Pipeline, PipelineConfig, SampleUpload, Tier};
//!
//! # async fn run() -> Result<(), handscribe::PipelineError> {
//! let pipeline = Pipeline::from_config(&PipelineConfig::default())?;
//!
//! let scan = std::fs::read("alphabet.png").map_err(|e| {
//!     handscribe::PipelineError::InvalidRequest(e.to_string())
//! })?;
//! pipeline
//!     .submit_samples("alice", vec![SampleUpload::new(Some("alphabet.png".into()), scan)])
//!     .await?;
//!
//! let image = pipeline.generate("alice", "hello world", Tier::Standard).await?;
//! println!("{}", image.path.display());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod images;
pub mod pipeline;

pub use crate::config::{ConfigLoadError, PipelineConfig, TierConfig};
pub use crate::error::{ErrorKind, PipelineError};
pub use crate::images::{GeneratedImageRef, ImageStore, MonotonicClock};
pub use crate::pipeline::{Pipeline, SampleUpload, SubmissionReceipt};

pub use generation::{GenerationCapability, GenerationConfig, GenerationError, Orchestrator};
pub use profile::{ProfileStore, StoreConfig, StoreError, StyleProfile, UserId};
pub use prompt::{PromptBundle, PromptPolicy, Tier, TierParams, TierTable};
pub use style::{AnalysisError, EncoderConfig, StyleEncoder, StyleExtractor};

pub use generation;
pub use profile;
pub use prompt;
pub use style;
