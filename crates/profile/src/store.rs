use std::path::PathBuf;
use std::sync::Arc;

use crate::{FsProfileStore, InMemoryProfileStore, StoreError, StyleProfile, UserId};

/// Per-user profile persistence.
///
/// Implementations keep exactly one profile per user id. `save` overwrites,
/// it never merges.
pub trait ProfileStore: Send + Sync {
    /// Write `profile` for `user_id`, replacing any earlier profile.
    ///
    /// A profile that fails [`StyleProfile::validate`] is refused with
    /// [`StoreError::Invalid`] and the stored one is left as it was.
    fn save(&self, user_id: &UserId, profile: &StyleProfile) -> Result<(), StoreError>;
    /// Read the profile for `user_id`.
    ///
    /// Fails with [`StoreError::NotFound`] when nothing was ever saved, never
    /// with `Corrupt` or `Storage`.
    fn load(&self, user_id: &UserId) -> Result<StyleProfile, StoreError>;
    /// Human-readable address of the profile (a file path, a memory key).
    fn location(&self, user_id: &UserId) -> String;
}

/// Selects and builds a [`ProfileStore`].
///
/// ```
/// use profile::StoreConfig;
///
/// // In-memory (tests, throwaway runs)
/// let config = StoreConfig::in_memory();
///
/// // One JSON file per user under /var/data/handscribe/profiles
/// let config = StoreConfig::filesystem("/var/data/handscribe");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum StoreConfig {
    /// JSON files under `{root}/profiles`.
    Filesystem { root: PathBuf },
    #[default]
    InMemory,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn filesystem<P: Into<PathBuf>>(root: P) -> Self {
        StoreConfig::Filesystem { root: root.into() }
    }

    /// Build the backend. The filesystem variant creates its directory here,
    /// so a bad storage root fails at startup instead of on first request.
    pub fn build(&self) -> Result<Arc<dyn ProfileStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Arc::new(InMemoryProfileStore::new())),
            StoreConfig::Filesystem { root } => Ok(Arc::new(FsProfileStore::open(root)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_in_memory() {
        assert_eq!(StoreConfig::default(), StoreConfig::InMemory);
    }

    #[test]
    fn built_stores_behave_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let configs = [StoreConfig::in_memory(), StoreConfig::filesystem(dir.path())];
        let user = UserId::parse("carol").unwrap();

        for config in configs {
            let store = config.build().unwrap();
            assert!(matches!(store.load(&user), Err(StoreError::NotFound(_))));
            store
                .save(&user, &StyleProfile::new(vec![1.0, 2.0, 3.0]))
                .unwrap();
            assert_eq!(store.load(&user).unwrap().embedding, vec![1.0, 2.0, 3.0]);
        }
    }
}
