use std::io;
use thiserror::Error;

/// Errors surfaced by a [`ProfileStore`](crate::ProfileStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Nothing has been saved for this user yet.
    #[error("no style profile stored for user '{0}'")]
    NotFound(String),
    /// Disk full, permission denied, poisoned lock and friends.
    #[error("storage failure ({context}): {source}")]
    Storage {
        context: String,
        #[source]
        source: io::Error,
    },
    /// The stored bytes exist but do not decode into a [`StyleProfile`](crate::StyleProfile).
    #[error("stored profile for user '{user_id}' is corrupt: {reason}")]
    Corrupt { user_id: String, reason: String },
    /// Refused at save time; the previously stored profile is untouched.
    #[error("refusing to store profile for user '{user_id}': {source}")]
    Invalid {
        user_id: String,
        #[source]
        source: InvalidProfile,
    },
}

impl StoreError {
    pub(crate) fn storage(context: impl Into<String>, source: io::Error) -> Self {
        StoreError::Storage {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn invalid(user_id: &crate::UserId, source: InvalidProfile) -> Self {
        StoreError::Invalid {
            user_id: user_id.to_string(),
            source,
        }
    }
}

/// A profile that must not be handed to a generation capability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidProfile {
    #[error("style embedding is missing or empty")]
    EmptyEmbedding,
    #[error("style embedding has a non-finite value at index {index}")]
    NonFinite { index: usize },
}

/// Rejected user identifier. User ids become file names, so the accepted
/// alphabet is deliberately small.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid user id {value:?}: {reason}")]
pub struct InvalidUserId {
    pub value: String,
    pub reason: &'static str,
}
