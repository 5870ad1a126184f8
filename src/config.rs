//! Pipeline configuration.
//!
//! The server nests this under its `pipeline` key; it can also be loaded on
//! its own from YAML.
//!
//! ```yaml
//! data_dir: "/var/data/handscribe"
//! store: "filesystem"
//!
//! encoder:
//!   mode: "api"
//!   api_url: "https://vision.internal/embed"
//!   dimension: 768
//!
//! generation:
//!   mode: "remote"
//!   remote_url: "https://gen.internal"
//!   remote_timeout_secs: 300
//!
//! tiers:
//!   preset: "gpu-hosted"
//!   premium:
//!     inference_steps: 40
//!     style_scale: 0.8
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use generation::GenerationConfig;
use profile::StoreConfig;
use prompt::{PolicyError, TierParams, TierTable};
use serde::{Deserialize, Serialize};
use style::EncoderConfig;
use thiserror::Error;

/// Errors that can occur when loading a pipeline configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Storage roots, capability selection and tier parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Persistent-storage root. Profiles go to `profiles/`, images to
    /// `generated_images/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// `"filesystem"` or `"memory"`.
    #[serde(default = "default_store")]
    pub store: String,

    /// Parent of the per-request sample scratch directories. System temp
    /// dir when unset.
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,

    #[serde(default)]
    pub encoder: EncoderConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub tiers: TierConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            store: default_store(),
            scratch_dir: None,
            encoder: EncoderConfig::default(),
            generation: GenerationConfig::default(),
            tiers: TierConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        self.store_config()?;
        if self.encoder.dimension == 0 {
            return Err(ConfigLoadError::Validation(
                "encoder.dimension must be >= 1".to_string(),
            ));
        }
        match self.generation.mode.as_str() {
            "stub" | "local" => {}
            "remote" => {
                if self.generation.remote_url.is_none() {
                    return Err(ConfigLoadError::Validation(
                        "generation.remote_url is required for remote mode".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigLoadError::Validation(format!(
                    "unknown generation.mode '{other}'"
                )));
            }
        }
        self.tiers
            .table()
            .map_err(|e| ConfigLoadError::Validation(format!("tiers: {e}")))?;
        Ok(())
    }

    pub fn store_config(&self) -> Result<StoreConfig, ConfigLoadError> {
        match self.store.as_str() {
            "filesystem" | "fs" => Ok(StoreConfig::filesystem(&self.data_dir)),
            "memory" | "in_memory" => Ok(StoreConfig::in_memory()),
            other => Err(ConfigLoadError::Validation(format!(
                "unknown store '{other}', expected 'filesystem' or 'memory'"
            ))),
        }
    }
}

/// A named preset with optional per-tier overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    #[serde(default = "default_preset")]
    pub preset: String,

    #[serde(default)]
    pub standard: Option<TierParams>,

    #[serde(default)]
    pub premium: Option<TierParams>,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
            standard: None,
            premium: None,
        }
    }
}

impl TierConfig {
    /// Resolve the preset, apply overrides and check the result.
    pub fn table(&self) -> Result<TierTable, PolicyError> {
        let mut table = TierTable::preset(&self.preset)?;
        if let Some(standard) = self.standard {
            table.standard = standard;
        }
        if let Some(premium) = self.premium {
            table.premium = premium;
        }
        table.validate()?;
        Ok(table)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/data/handscribe")
}
fn default_store() -> String {
    "filesystem".to_string()
}
fn default_preset() -> String {
    TierTable::PERSISTENT.to_string()
}
