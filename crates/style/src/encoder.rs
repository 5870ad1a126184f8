use async_trait::async_trait;
use image::RgbImage;

use crate::AnalysisError;

/// The vision feature extractor: RGB images in, one fixed-size vector per
/// image out.
#[async_trait]
pub trait StyleEncoder: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    /// Length of every vector this encoder produces. A design-time constant
    /// of the underlying model.
    fn dimension(&self) -> usize;

    /// Encode `images`, returning vectors in the same order.
    async fn encode(&self, images: &[RgbImage]) -> Result<Vec<Vec<f32>>, AnalysisError>;
}
