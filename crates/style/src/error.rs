use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a set of samples could not be turned into a style profile.
///
/// Every variant means "no profile"; callers should report the analysis as
/// unavailable rather than retry on their own.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no sample images were provided")]
    NoSamples,
    #[error("failed to read sample {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode sample {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The encoder capability itself failed (model error, HTTP error, bad response).
    #[error("style encoder failure: {0}")]
    Encoder(String),
    #[error("encoder returned {got} vectors for {expected} images")]
    CountMismatch { expected: usize, got: usize },
    #[error("encoder produced a {got}-dimensional vector, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
    /// The averaged embedding cannot be stored (empty or non-finite).
    #[error("style embedding is unusable: {0}")]
    InvalidEmbedding(#[from] profile::InvalidProfile),
    #[error("invalid encoder config: {0}")]
    InvalidConfig(String),
}
