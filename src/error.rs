use std::io;

use generation::GenerationError;
use profile::{InvalidUserId, StoreError};
use prompt::PolicyError;
use style::AnalysisError;
use thiserror::Error;

use crate::config::ConfigLoadError;

/// Everything a [`Pipeline`](crate::Pipeline) call can fail with.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidUserId(#[from] InvalidUserId),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Policy(#[from] PolicyError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigLoadError),
    /// Sample scratch space or generated-image storage failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

/// Coarse classification used by the HTTP layer and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    InvalidProfile,
    AnalysisFailure,
    GenerationFailure,
    RemoteUnavailable,
    RemoteError,
    StorageFailure,
    Corrupt,
    InvalidConfig,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::InvalidProfile => "invalid_profile",
            ErrorKind::AnalysisFailure => "analysis_failure",
            ErrorKind::GenerationFailure => "generation_failure",
            ErrorKind::RemoteUnavailable => "remote_unavailable",
            ErrorKind::RemoteError => "remote_error",
            ErrorKind::StorageFailure => "storage_failure",
            ErrorKind::Corrupt => "corrupt",
            ErrorKind::InvalidConfig => "invalid_config",
        }
    }
}

impl PipelineError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidUserId(_) | PipelineError::InvalidRequest(_) => {
                ErrorKind::InvalidRequest
            }
            PipelineError::Store(err) => match err {
                StoreError::NotFound(_) => ErrorKind::NotFound,
                StoreError::Storage { .. } => ErrorKind::StorageFailure,
                StoreError::Corrupt { .. } => ErrorKind::Corrupt,
                StoreError::Invalid { .. } => ErrorKind::InvalidProfile,
            },
            PipelineError::Analysis(err) => match err {
                AnalysisError::NoSamples => ErrorKind::InvalidRequest,
                AnalysisError::InvalidConfig(_) => ErrorKind::InvalidConfig,
                _ => ErrorKind::AnalysisFailure,
            },
            PipelineError::Policy(err) => match err {
                PolicyError::UnknownTier(_) => ErrorKind::InvalidRequest,
                PolicyError::UnknownPreset(_) | PolicyError::InvalidTable(_) => {
                    ErrorKind::InvalidConfig
                }
            },
            PipelineError::Generation(err) => match err {
                GenerationError::InvalidProfile(_) => ErrorKind::InvalidProfile,
                GenerationError::RemoteUnavailable(_) => ErrorKind::RemoteUnavailable,
                GenerationError::RemoteError { .. } => ErrorKind::RemoteError,
                GenerationError::Failed(_) => ErrorKind::GenerationFailure,
                GenerationError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            },
            PipelineError::Config(_) => ErrorKind::InvalidConfig,
            PipelineError::Io { .. } => ErrorKind::StorageFailure,
        }
    }
}
