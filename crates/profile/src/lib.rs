//! Handscribe style profiles
//!
//! A style profile is the averaged embedding of a user's handwriting samples.
//! This crate owns the profile type and the contract for storing one profile
//! per user id.
//!
//! Two backends ship with the crate:
//!
//! - **Filesystem** - one pretty-printed JSON file per user under
//!   `{root}/profiles/{user_id}_style.json`. Writes are atomic renames, so a
//!   concurrent reader sees either the old profile or the new one.
//! - **In-memory** - a locked `HashMap`, handy for tests and throwaway runs.
//!
//! There is no locking across requests. Two saves for the same user race and
//! the last one to finish wins.
//!
//! ```
//! use profile::{StoreConfig, StyleProfile, UserId};
//!
//! let store = StoreConfig::in_memory().build().unwrap();
//! let alice = UserId::parse("alice").unwrap();
//! store.save(&alice, &StyleProfile::new(vec![0.25, 0.5])).unwrap();
//! assert_eq!(store.load(&alice).unwrap().embedding, vec![0.25, 0.5]);
//! ```

pub mod error;
pub mod fs;
pub mod memory;
pub mod store;
pub mod types;

pub use crate::error::{InvalidProfile, InvalidUserId, StoreError};
pub use crate::fs::FsProfileStore;
pub use crate::memory::InMemoryProfileStore;
pub use crate::store::{ProfileStore, StoreConfig};
pub use crate::types::{StyleProfile, UserId, PROFILE_VERSION};
