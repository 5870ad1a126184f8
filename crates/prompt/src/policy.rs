use serde::{Deserialize, Serialize};

use crate::{PolicyError, Tier, TierTable};

/// Steers the sampler away from the usual failure modes. Same for every tier.
pub const NEGATIVE_PROMPT: &str = "blurry, distorted, malformed, text overlay, watermark, signature, messy, low-resolution, discolored, cropped, cut-off";

/// Everything derived from one request. Computed fresh each time, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptBundle {
    /// The user's text, untouched.
    pub text: String,
    pub tier: Tier,
    pub full_prompt: String,
    pub negative_prompt: String,
    pub inference_steps: u32,
    pub style_scale: f32,
}

/// Maps `(text, tier)` to a [`PromptBundle`] using a validated [`TierTable`].
#[derive(Debug, Clone, Default)]
pub struct PromptPolicy {
    table: TierTable,
}

impl PromptPolicy {
    pub fn new(table: TierTable) -> Result<Self, PolicyError> {
        table.validate()?;
        Ok(Self { table })
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    pub fn build(&self, raw_text: &str, tier: Tier) -> PromptBundle {
        let params = self.table.params(tier);
        PromptBundle {
            text: raw_text.to_string(),
            tier,
            full_prompt: full_prompt(raw_text, tier),
            negative_prompt: NEGATIVE_PROMPT.to_string(),
            inference_steps: params.inference_steps,
            style_scale: params.style_scale,
        }
    }
}

fn full_prompt(text: &str, tier: Tier) -> String {
    match tier {
        Tier::Standard => {
            format!("A clear photo of the following text written on paper: '{text}'")
        }
        // Layout control comes from the wording alone, no model changes.
        Tier::Premium => format!(
            "A high-resolution, centered scan of a handwritten note on a clean sheet of white paper. \
             The text is neatly written in a single column. The note says: '{text}'"
        ),
    }
}
