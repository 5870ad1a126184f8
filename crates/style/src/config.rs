use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::stub::VIT_BASE_DIMENSION;
use crate::{AnalysisError, ApiEncoder, StubEncoder, StyleEncoder};

/// Which vision encoder to run and how to reach it.
///
/// ```
/// use style::EncoderConfig;
///
/// let cfg = EncoderConfig {
///     mode: "api".into(),
///     api_url: Some("https://vision.internal/embed".into()),
///     api_auth_header: Some("Bearer xxx".into()),
///     ..Default::default()
/// };
/// assert!(cfg.build().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncoderConfig {
    /// `"stub"` (deterministic, offline) or `"api"` (remote endpoint).
    pub mode: String,
    /// Vector length the encoder produces.
    pub dimension: usize,
    /// Endpoint for `"api"` mode.
    pub api_url: Option<String>,
    /// Authorization header value, e.g. `"Bearer xxx"`.
    #[serde(skip_serializing)]
    pub api_auth_header: Option<String>,
    /// Whole-request timeout for `"api"` mode.
    pub api_timeout_secs: u64,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            dimension: VIT_BASE_DIMENSION,
            api_url: None,
            api_auth_header: None,
            api_timeout_secs: 60,
        }
    }
}

impl EncoderConfig {
    /// Construct the configured encoder. Bad configuration fails here, at
    /// startup, rather than on the first upload.
    pub fn build(&self) -> Result<Arc<dyn StyleEncoder>, AnalysisError> {
        if self.dimension == 0 {
            return Err(AnalysisError::InvalidConfig(
                "dimension must be at least 1".into(),
            ));
        }

        match self.mode.as_str() {
            "stub" | "fast" => Ok(Arc::new(StubEncoder::new(self.dimension))),
            "api" => {
                let url = self.api_url.as_deref().ok_or_else(|| {
                    AnalysisError::InvalidConfig("api_url is required for api mode".into())
                })?;
                Ok(Arc::new(ApiEncoder::new(
                    url,
                    self.api_auth_header.clone(),
                    self.dimension,
                    Duration::from_secs(self.api_timeout_secs),
                )?))
            }
            other => Err(AnalysisError::InvalidConfig(format!(
                "unknown encoder mode '{other}', expected 'stub' or 'api'"
            ))),
        }
    }
}
