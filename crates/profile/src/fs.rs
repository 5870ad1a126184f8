use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::{ProfileStore, StoreError, StyleProfile, UserId};

const PROFILES_DIR: &str = "profiles";

/// Stores each profile as `{root}/profiles/{user_id}_style.json`.
#[derive(Debug, Clone)]
pub struct FsProfileStore {
    dir: PathBuf,
}

impl FsProfileStore {
    /// Open (and create if needed) the profile directory under `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let dir = root.as_ref().join(PROFILES_DIR);
        fs::create_dir_all(&dir)
            .map_err(|e| StoreError::storage(format!("creating {}", dir.display()), e))?;
        tracing::debug!(dir = %dir.display(), "profile store ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, user_id: &UserId) -> PathBuf {
        self.dir.join(format!("{user_id}_style.json"))
    }

    fn write_atomically(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl ProfileStore for FsProfileStore {
    fn save(&self, user_id: &UserId, profile: &StyleProfile) -> Result<(), StoreError> {
        // JSON has no encoding for NaN or infinity.
        profile
            .validate()
            .map_err(|e| StoreError::invalid(user_id, e))?;
        let path = self.path_for(user_id);
        let bytes = serde_json::to_vec_pretty(profile)
            .map_err(|e| StoreError::storage("encoding profile", io::Error::other(e)))?;

        self.write_atomically(&path, &bytes)
            .map_err(|e| StoreError::storage(format!("writing {}", path.display()), e))?;

        tracing::debug!(
            user_id = %user_id,
            path = %path.display(),
            dimension = profile.dimension(),
            "saved style profile"
        );
        Ok(())
    }

    fn load(&self, user_id: &UserId) -> Result<StyleProfile, StoreError> {
        let path = self.path_for(user_id);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(user_id.to_string()))
            }
            Err(e) => {
                return Err(StoreError::storage(
                    format!("reading {}", path.display()),
                    e,
                ))
            }
        };

        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt {
            user_id: user_id.to_string(),
            reason: e.to_string(),
        })
    }

    fn location(&self, user_id: &UserId) -> String {
        self.path_for(user_id).display().to_string()
    }
}
