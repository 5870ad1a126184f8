//! Handscribe generation
//!
//! Renders a [`PromptBundle`] in a user's handwriting, conditioned on their
//! [`StyleProfile`]. The caller sees one interface, [`GenerationCapability`],
//! with interchangeable strategies picked at deployment time:
//!
//! - **In-process** ([`LocalGenerator`]) - drive a [`DiffusionSampler`] on
//!   this machine. Calls are serialized per accelerator; a second request
//!   queues instead of fighting for device memory.
//! - **Remote** ([`RemoteGenerator`]) - POST `{style_profile, prompt,
//!   is_premium}` to an inference service and take the body as the image.
//!   Timeouts are generous because the service may be cold-starting.
//!
//! The [`Orchestrator`] sits in front of both and refuses profiles with an
//! empty embedding before anything expensive happens. Nothing here retries.
//!
//! ```no_run
//! use generation::{GenerationConfig, Orchestrator};
//! use profile::StyleProfile;
//! use prompt::{PromptPolicy, Tier};
//!
//! # async fn run() -> Result<(), generation::GenerationError> {
//! let orchestrator = Orchestrator::new(GenerationConfig::default().build()?);
//! let bundle = PromptPolicy::default().build("hello world", Tier::Standard);
//! let png = orchestrator
//!     .generate(&StyleProfile::new(vec![0.1; 768]), &bundle)
//!     .await?;
//! assert!(!png.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;

mod capability;
mod local;
mod orchestrator;
mod remote;
mod stub;

pub use crate::capability::GenerationCapability;
pub use crate::config::GenerationConfig;
pub use crate::error::GenerationError;
pub use crate::local::{
    encode_png, DiffusionSampler, LocalGenerator, SamplerError, SamplingRequest, StyleTensor,
};
pub use crate::orchestrator::Orchestrator;
pub use crate::remote::{RemoteGenerator, RemoteRequest};
pub use crate::stub::StubSampler;

pub use profile::StyleProfile;
pub use prompt::PromptBundle;
