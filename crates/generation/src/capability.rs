use async_trait::async_trait;
use bytes::Bytes;
use profile::StyleProfile;
use prompt::PromptBundle;

use crate::GenerationError;

/// "Given a prompt bundle and a style vector, produce one encoded image."
///
/// Implementations may assume the profile already passed
/// [`StyleProfile::validate`]; the [`Orchestrator`](crate::Orchestrator)
/// guarantees it.
#[async_trait]
pub trait GenerationCapability: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &str;

    async fn generate(
        &self,
        profile: &StyleProfile,
        bundle: &PromptBundle,
    ) -> Result<Bytes, GenerationError>;
}
