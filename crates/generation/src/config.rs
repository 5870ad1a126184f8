use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::{GenerationCapability, GenerationError, LocalGenerator, RemoteGenerator, StubSampler};

/// Generation strategy selection.
///
/// `mode = "stub"` runs [`StubSampler`] in-process; `mode = "remote"` posts
/// to `remote_url`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub mode: String,
    pub remote_url: Option<String>,
    /// Whole-request timeout. The service may be cold-starting.
    pub remote_timeout_secs: u64,
    pub stub_width: u32,
    pub stub_height: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mode: "stub".into(),
            remote_url: None,
            remote_timeout_secs: 300,
            stub_width: 512,
            stub_height: 512,
        }
    }
}

impl GenerationConfig {
    pub fn build(&self) -> Result<Arc<dyn GenerationCapability>, GenerationError> {
        match self.mode.as_str() {
            "stub" | "local" => Ok(Arc::new(LocalGenerator::new(StubSampler::new(
                self.stub_width,
                self.stub_height,
            )))),
            "remote" => {
                let url = self.remote_url.as_deref().ok_or_else(|| {
                    GenerationError::InvalidConfig("remote_url is required for remote mode".into())
                })?;
                if self.remote_timeout_secs == 0 {
                    return Err(GenerationError::InvalidConfig(
                        "remote_timeout_secs must be at least 1".into(),
                    ));
                }
                Ok(Arc::new(RemoteGenerator::new(
                    url,
                    Duration::from_secs(self.remote_timeout_secs),
                )?))
            }
            other => Err(GenerationError::InvalidConfig(format!(
                "unknown generation mode '{other}', expected 'stub' or 'remote'"
            ))),
        }
    }
}
