use async_trait::async_trait;
use fxhash::hash64;
use image::RgbImage;

use crate::{AnalysisError, StyleEncoder};

/// Pooled output size of a ViT-base/16 encoder.
pub(crate) const VIT_BASE_DIMENSION: usize = 768;

/// Deterministic stand-in for a real vision encoder.
///
/// Vectors are derived from a hash of the pixels, so identical images always
/// map to identical vectors and different images almost always differ. Values
/// land in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct StubEncoder {
    dimension: usize,
}

impl StubEncoder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for StubEncoder {
    fn default() -> Self {
        Self::new(VIT_BASE_DIMENSION)
    }
}

pub(crate) fn stub_vector(image: &RgbImage, dimension: usize) -> Vec<f32> {
    let seed = hash64(&(image.width(), image.height(), image.as_raw()));
    (0..dimension)
        .map(|idx| {
            let h = hash64(&(seed, idx));
            (h as f64 / u64::MAX as f64 * 2.0 - 1.0) as f32
        })
        .collect()
}

#[async_trait]
impl StyleEncoder for StubEncoder {
    fn name(&self) -> &str {
        "stub"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn encode(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>, AnalysisError> {
        Ok(images
            .iter()
            .map(|image| stub_vector(image, self.dimension))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(16, 16, Rgb(color))
    }

    #[tokio::test]
    async fn stub_dimension_defaults_to_vit_base() {
        let encoder = StubEncoder::default();
        let vectors = encoder.encode(&[solid([0, 0, 0])]).await.unwrap();
        assert_eq!(encoder.dimension(), 768);
        assert_eq!(vectors[0].len(), 768);
    }

    #[tokio::test]
    async fn stub_is_deterministic() {
        let encoder = StubEncoder::new(64);
        let a = encoder.encode(&[solid([10, 20, 30])]).await.unwrap();
        let b = encoder.encode(&[solid([10, 20, 30])]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn stub_distinguishes_images() {
        let encoder = StubEncoder::new(64);
        let vectors = encoder
            .encode(&[solid([255, 255, 255]), solid([0, 0, 0])])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert_ne!(vectors[0], vectors[1]);
    }

    #[test]
    fn stub_values_are_bounded() {
        let v = stub_vector(&solid([1, 2, 3]), 256);
        assert!(v.iter().all(|x| (-1.0..=1.0).contains(x)));
    }
}
