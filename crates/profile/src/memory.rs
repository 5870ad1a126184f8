use std::collections::HashMap;
use std::io;
use std::sync::RwLock;

use crate::{ProfileStore, StoreError, StyleProfile, UserId};

/// An in-memory store using a `RwLock` around a `HashMap`.
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<UserId, StyleProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.profiles.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::storage("in-memory store", io::Error::other("poisoned lock"))
}

impl ProfileStore for InMemoryProfileStore {
    fn save(&self, user_id: &UserId, profile: &StyleProfile) -> Result<(), StoreError> {
        profile
            .validate()
            .map_err(|e| StoreError::invalid(user_id, e))?;
        self.profiles
            .write()
            .map_err(|_| poisoned())?
            .insert(user_id.clone(), profile.clone());
        Ok(())
    }

    fn load(&self, user_id: &UserId) -> Result<StyleProfile, StoreError> {
        let guard = self.profiles.read().map_err(|_| poisoned())?;
        guard
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    fn location(&self, user_id: &UserId) -> String {
        format!("memory://profiles/{user_id}")
    }
}
