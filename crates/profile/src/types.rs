use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InvalidProfile, InvalidUserId};

/// Version tag stamped on every profile this crate creates.
pub const PROFILE_VERSION: &str = "1.1-ip-adapter-ready";

const MAX_USER_ID_LEN: usize = 128;

/// Averaged handwriting embedding for one user.
///
/// The embedding is serialized as `style_embedding`, which is also the shape
/// the remote generation service expects inside `style_profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StyleProfile {
    /// Element-wise mean of the per-sample vectors. A missing key decodes to
    /// an empty vector so that [`validate`](Self::validate) reports it.
    #[serde(rename = "style_embedding", default)]
    pub embedding: Vec<f32>,
    /// Schema/compatibility tag, see [`PROFILE_VERSION`].
    #[serde(default = "default_version")]
    pub version: String,
}

impl StyleProfile {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            version: PROFILE_VERSION.to_string(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.embedding.len()
    }

    /// Checks the profile can condition a generation call.
    pub fn validate(&self) -> Result<(), InvalidProfile> {
        if self.embedding.is_empty() {
            return Err(InvalidProfile::EmptyEmbedding);
        }
        if let Some(index) = self.embedding.iter().position(|v| !v.is_finite()) {
            return Err(InvalidProfile::NonFinite { index });
        }
        Ok(())
    }
}

fn default_version() -> String {
    PROFILE_VERSION.to_string()
}

/// Validated user identifier, safe to embed in a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidUserId> {
        let value: String = raw.into();
        let reject = |reason| {
            Err(InvalidUserId {
                value: value.clone(),
                reason,
            })
        };

        if value.is_empty() {
            return reject("must not be empty");
        }
        if value.len() > MAX_USER_ID_LEN {
            return reject("longer than 128 bytes");
        }
        if value == "." || value == ".." {
            return reject("path segments are not allowed");
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
        {
            return reject("only ASCII letters, digits and '-', '_', '.', '@' are allowed");
        }
        Ok(UserId(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = InvalidUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserId::parse(s)
    }
}

impl TryFrom<String> for UserId {
    type Error = InvalidUserId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::parse(value)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        UserId::parse(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_carries_current_version() {
        let profile = StyleProfile::new(vec![0.1, 0.2]);
        assert_eq!(profile.version, PROFILE_VERSION);
        assert_eq!(profile.dimension(), 2);
    }

    #[test]
    fn serializes_embedding_as_style_embedding() {
        let profile = StyleProfile::new(vec![0.5]);
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["style_embedding"], serde_json::json!([0.5]));
        assert_eq!(value["version"], PROFILE_VERSION);
    }

    #[test]
    fn missing_embedding_decodes_empty_and_fails_validation() {
        let profile: StyleProfile = serde_json::from_str(r#"{"version": "1.0"}"#).unwrap();
        assert!(profile.embedding.is_empty());
        assert_eq!(profile.validate(), Err(InvalidProfile::EmptyEmbedding));
    }

    #[test]
    fn non_finite_values_fail_validation() {
        let profile = StyleProfile::new(vec![0.1, f32::NAN, 0.3]);
        assert_eq!(
            profile.validate(),
            Err(InvalidProfile::NonFinite { index: 1 })
        );
    }

    #[test]
    fn valid_profile_passes() {
        assert!(StyleProfile::new(vec![0.0; 768]).validate().is_ok());
    }

    #[test]
    fn user_id_accepts_common_identifiers() {
        for raw in ["alice", "user-42", "a.b_c", "bob@example.com", "6f1c2a9e-1d"] {
            assert!(UserId::parse(raw).is_ok(), "{raw} should be accepted");
        }
    }

    #[test]
    fn user_id_rejects_path_tricks() {
        for raw in ["", ".", "..", "../alice", "a/b", "a\\b", "a b", "ümlaut"] {
            assert!(UserId::parse(raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn user_id_rejects_overlong_values() {
        assert!(UserId::parse("a".repeat(129)).is_err());
        assert!(UserId::parse("a".repeat(128)).is_ok());
    }

    #[test]
    fn user_id_deserialize_validates() {
        let ok: UserId = serde_json::from_str(r#""alice""#).unwrap();
        assert_eq!(ok.as_str(), "alice");
        assert!(serde_json::from_str::<UserId>(r#""../x""#).is_err());
    }
}
