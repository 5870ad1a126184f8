use crate::config::ServerConfig;
use crate::error::ServerResult;
use handscribe::Pipeline;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Submission and generation pipeline (shared across requests)
    pub pipeline: Arc<Pipeline>,

    /// Renders `/metrics`; `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// Create new server state from already-constructed parts.
    pub fn new(
        config: ServerConfig,
        pipeline: Pipeline,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            metrics,
        }
    }

    /// Build the pipeline named by `config.pipeline`.
    pub fn from_config(
        config: ServerConfig,
        metrics: Option<PrometheusHandle>,
    ) -> ServerResult<Self> {
        let pipeline = Pipeline::from_config(&config.pipeline)?;
        Ok(Self::new(config, pipeline, metrics))
    }

    /// Public URL of a generated image.
    pub fn image_url(&self, file_name: &str) -> String {
        format!(
            "{}/generated_images/{}",
            self.config.public_base_url.trim_end_matches('/'),
            file_name
        )
    }
}
