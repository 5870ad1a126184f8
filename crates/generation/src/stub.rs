use fxhash::hash64;
use image::{Rgb, RgbImage};

use crate::local::{DiffusionSampler, SamplerError, SamplingRequest};

const PAPER: Rgb<u8> = Rgb([250, 248, 240]);
const INK: Rgb<u8> = Rgb([28, 32, 64]);

/// Deterministic stand-in for the diffusion model.
///
/// Paints ink strokes on a paper-coloured canvas, seeded from the prompt and
/// the style embedding. Same inputs, same pixels. Used for development and
/// tests where no accelerator is available.
#[derive(Debug, Clone)]
pub struct StubSampler {
    width: u32,
    height: u32,
}

impl StubSampler {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    fn render(&self, seed: u64) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.width, self.height, PAPER);
        let line_height = (self.height / 12).max(4);
        let margin = self.width / 16;

        let mut y = line_height;
        let mut line = 0u64;
        while y + 2 < self.height {
            let line_seed = hash64(&(seed, line));
            let span = self.width.saturating_sub(2 * margin).max(1);
            let len = (line_seed % u64::from(span)) as u32;
            for x in margin..(margin + len).min(self.width) {
                let wobble = (hash64(&(line_seed, x / 3)) % 3) as u32;
                let py = (y + wobble).min(self.height - 1);
                canvas.put_pixel(x, py, INK);
            }
            y += line_height;
            line += 1;
        }
        canvas
    }
}

impl Default for StubSampler {
    fn default() -> Self {
        Self::new(512, 512)
    }
}

impl DiffusionSampler for StubSampler {
    fn device(&self) -> &str {
        "stub"
    }

    fn sample(&self, request: &SamplingRequest) -> Result<Vec<RgbImage>, SamplerError> {
        let bits: Vec<u32> = request
            .style_embedding
            .data
            .iter()
            .map(|v| v.to_bits())
            .collect();
        let seed = hash64(&(request.prompt.as_str(), bits, request.inference_steps));
        Ok((0..request.num_samples.max(1) as u64)
            .map(|n| self.render(hash64(&(seed, n))))
            .collect())
    }
}
