use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use profile::StyleProfile;

use crate::{mean_embedding, AnalysisError, StyleEncoder};

/// Wraps a [`StyleEncoder`] and produces averaged [`StyleProfile`]s.
#[derive(Clone)]
pub struct StyleExtractor {
    encoder: Arc<dyn StyleEncoder>,
}

impl StyleExtractor {
    pub fn new(encoder: Arc<dyn StyleEncoder>) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &Arc<dyn StyleEncoder> {
        &self.encoder
    }

    /// Decode every sample, encode it, and average the vectors.
    ///
    /// Any unreadable image or encoder error aborts the whole extraction.
    pub async fn extract<P: AsRef<Path>>(
        &self,
        image_paths: &[P],
    ) -> Result<StyleProfile, AnalysisError> {
        if image_paths.is_empty() {
            return Err(AnalysisError::NoSamples);
        }

        let start = Instant::now();
        let paths: Vec<PathBuf> = image_paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        // Decoding is CPU-bound; keep it off the async workers.
        let images = tokio::task::spawn_blocking(move || load_samples(&paths))
            .await
            .map_err(|e| AnalysisError::Encoder(format!("sample decoding task failed: {e}")))??;

        let vectors = self.encoder.encode(&images).await?;
        if vectors.len() != images.len() {
            return Err(AnalysisError::CountMismatch {
                expected: images.len(),
                got: vectors.len(),
            });
        }

        let embedding = mean_embedding(&vectors, self.encoder.dimension())?;
        let profile = StyleProfile::new(embedding);
        profile.validate()?;

        tracing::info!(
            encoder = self.encoder.name(),
            samples = images.len(),
            dimension = profile.dimension(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "extracted style embedding"
        );

        Ok(profile)
    }
}

/// Read and decode each sample, normalizing to 8-bit RGB.
///
/// The format is sniffed from the bytes, so file extensions do not matter.
pub fn load_samples<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<RgbImage>, AnalysisError> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|source| AnalysisError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let decoded =
                image::load_from_memory(&bytes).map_err(|source| AnalysisError::Decode {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(decoded.to_rgb8())
        })
        .collect()
}
