//! Handscribe prompt policy
//!
//! Turns raw user text plus a quality [`Tier`] into everything the generator
//! needs: the full prompt, the negative prompt, the number of sampling steps
//! and the style-conditioning scale.
//!
//! Premium buys more sampling steps, a stronger pull towards the user's style,
//! and a prompt that spells out the page layout (centered, single column,
//! clean white paper). Everything here is a pure function of its inputs.
//!
//! ```
//! use prompt::{PromptPolicy, Tier};
//!
//! let policy = PromptPolicy::default();
//! let bundle = policy.build("hello world", Tier::Premium);
//! assert_eq!(bundle.inference_steps, 50);
//! assert!(bundle.full_prompt.ends_with("The note says: 'hello world'"));
//! ```

pub mod error;
pub mod policy;
pub mod tier;

pub use crate::error::PolicyError;
pub use crate::policy::{PromptBundle, PromptPolicy, NEGATIVE_PROMPT};
pub use crate::tier::{Tier, TierParams, TierTable};
