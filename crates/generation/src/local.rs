use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, RgbImage};
use profile::StyleProfile;
use prompt::PromptBundle;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::{GenerationCapability, GenerationError};

/// Error type of the opaque sampler capability.
pub type SamplerError = Box<dyn std::error::Error + Send + Sync>;

/// Row-major `rows x cols` tensor. Style embeddings go in as a `1 x D` batch.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleTensor {
    pub shape: [usize; 2],
    pub data: Vec<f32>,
}

impl StyleTensor {
    pub fn from_embedding(embedding: &[f32]) -> Self {
        Self {
            shape: [1, embedding.len()],
            data: embedding.to_vec(),
        }
    }
}

/// Inputs for one sampler call.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub style_embedding: StyleTensor,
    pub num_samples: usize,
    pub inference_steps: u32,
    pub style_scale: f32,
}

impl SamplingRequest {
    pub fn new(profile: &StyleProfile, bundle: &PromptBundle) -> Self {
        Self {
            prompt: bundle.full_prompt.clone(),
            negative_prompt: bundle.negative_prompt.clone(),
            style_embedding: StyleTensor::from_embedding(&profile.embedding),
            num_samples: 1,
            inference_steps: bundle.inference_steps,
            style_scale: bundle.style_scale,
        }
    }
}

/// The diffusion model with style-adapter conditioning. Blocking; it owns
/// the accelerator for the duration of a call.
pub trait DiffusionSampler: Send + Sync + 'static {
    /// Device label for logs (`"cuda"`, `"cpu"`, ...).
    fn device(&self) -> &str;

    fn sample(&self, request: &SamplingRequest) -> Result<Vec<RgbImage>, SamplerError>;
}

/// In-process strategy: run the sampler here and PNG-encode the first image.
pub struct LocalGenerator<S> {
    sampler: Arc<S>,
    permits: Arc<Semaphore>,
}

impl<S: DiffusionSampler> LocalGenerator<S> {
    /// One call at a time on the accelerator.
    pub fn new(sampler: S) -> Self {
        Self::with_concurrency(sampler, 1)
    }

    pub fn with_concurrency(sampler: S, concurrent_calls: usize) -> Self {
        Self {
            sampler: Arc::new(sampler),
            permits: Arc::new(Semaphore::new(concurrent_calls.max(1))),
        }
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}

#[async_trait]
impl<S: DiffusionSampler> GenerationCapability for LocalGenerator<S> {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(
        &self,
        profile: &StyleProfile,
        bundle: &PromptBundle,
    ) -> Result<Bytes, GenerationError> {
        let request = SamplingRequest::new(profile, bundle);

        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| GenerationError::Failed("sampler has shut down".into()))?;

        let sampler = self.sampler.clone();
        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let start = Instant::now();
            let images = sampler
                .sample(&request)
                .map_err(|e| GenerationError::Failed(e.to_string()))?;
            tracing::debug!(
                device = sampler.device(),
                steps = request.inference_steps,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "sampler finished"
            );

            let first = images
                .into_iter()
                .next()
                .ok_or_else(|| GenerationError::Failed("sampler returned no images".into()))?;
            encode_png(&first)
        });

        let png = task
            .await
            .map_err(|e| GenerationError::Failed(format!("sampling task failed: {e}")))??;
        Ok(Bytes::from(png))
    }
}

/// PNG-encode an RGB image.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, GenerationError> {
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| GenerationError::Failed(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}
