use profile::InvalidProfile;
use thiserror::Error;

/// Terminal failures of a generation request. None of them are retried.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The profile cannot condition generation (missing or empty embedding).
    #[error("invalid style profile: {0}")]
    InvalidProfile(#[from] InvalidProfile),
    /// The remote service could not be reached or did not answer in time.
    #[error("generation service unavailable: {0}")]
    RemoteUnavailable(String),
    /// The remote service answered with a non-2xx status.
    #[error("generation service returned {status}: {detail}")]
    RemoteError { status: u16, detail: String },
    /// The in-process sampler failed or produced nothing usable.
    #[error("image generation failed: {0}")]
    Failed(String),
    #[error("invalid generation config: {0}")]
    InvalidConfig(String),
}
