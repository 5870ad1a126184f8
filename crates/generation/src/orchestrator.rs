use bytes::Bytes;
use profile::StyleProfile;
use prompt::PromptBundle;
use std::sync::Arc;
use std::time::Instant;

use crate::{GenerationCapability, GenerationError};

/// Validates the profile, then hands off to the configured capability.
#[derive(Clone)]
pub struct Orchestrator {
    capability: Arc<dyn GenerationCapability>,
}

impl Orchestrator {
    pub fn new(capability: Arc<dyn GenerationCapability>) -> Self {
        Self { capability }
    }

    pub fn capability(&self) -> &Arc<dyn GenerationCapability> {
        &self.capability
    }

    /// Returns encoded image bytes. An empty or non-finite embedding fails
    /// with [`GenerationError::InvalidProfile`] without calling the capability.
    pub async fn generate(
        &self,
        profile: &StyleProfile,
        bundle: &PromptBundle,
    ) -> Result<Bytes, GenerationError> {
        profile.validate()?;

        let start = Instant::now();
        let result = self.capability.generate(profile, bundle).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(bytes) => tracing::info!(
                strategy = self.capability.name(),
                tier = %bundle.tier,
                steps = bundle.inference_steps,
                style_scale = bundle.style_scale,
                bytes = bytes.len(),
                elapsed_ms,
                "image generated"
            ),
            Err(err) => tracing::warn!(
                strategy = self.capability.name(),
                tier = %bundle.tier,
                elapsed_ms,
                error = %err,
                "image generation failed"
            ),
        }
        result
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("capability", &self.capability.name())
            .finish()
    }
}
