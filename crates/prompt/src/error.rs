use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("unknown tier '{0}', expected 'standard' or 'premium'")]
    UnknownTier(String),
    #[error("unknown tier preset '{0}', expected 'persistent' or 'gpu-hosted'")]
    UnknownPreset(String),
    #[error("invalid tier table: {0}")]
    InvalidTable(String),
}
