use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::PolicyError;

/// Quality level chosen per generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Standard,
    Premium,
}

impl Tier {
    pub fn from_premium_flag(is_premium: bool) -> Self {
        if is_premium {
            Tier::Premium
        } else {
            Tier::Standard
        }
    }

    pub fn is_premium(self) -> bool {
        matches!(self, Tier::Premium)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Standard => "standard",
            Tier::Premium => "premium",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "free" => Ok(Tier::Standard),
            "premium" => Ok(Tier::Premium),
            other => Err(PolicyError::UnknownTier(other.to_string())),
        }
    }
}

/// Numeric sampling parameters for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierParams {
    /// Diffusion sampling steps.
    pub inference_steps: u32,
    /// Style-adapter weight in `[0, 1]`; higher pulls harder towards the profile.
    pub style_scale: f32,
}

impl TierParams {
    pub const fn new(inference_steps: u32, style_scale: f32) -> Self {
        Self {
            inference_steps,
            style_scale,
        }
    }
}

/// Parameters for both tiers.
///
/// Two deployments exist with slightly different numbers, so both are kept as
/// presets and either can be overridden from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierTable {
    pub standard: TierParams,
    pub premium: TierParams,
}

impl TierTable {
    pub const PERSISTENT: &'static str = "persistent";
    pub const GPU_HOSTED: &'static str = "gpu-hosted";

    /// Long-running service with a persistent disk (CPU or GPU).
    pub const fn persistent() -> Self {
        Self {
            standard: TierParams::new(30, 0.6),
            premium: TierParams::new(50, 0.75),
        }
    }

    /// Per-prediction GPU endpoint, tuned for shorter runs.
    pub const fn gpu_hosted() -> Self {
        Self {
            standard: TierParams::new(25, 0.6),
            premium: TierParams::new(30, 0.7),
        }
    }

    /// Look up a preset by name. Underscores and hyphens are interchangeable.
    pub fn preset(name: &str) -> Result<Self, PolicyError> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            Self::PERSISTENT => Ok(Self::persistent()),
            Self::GPU_HOSTED => Ok(Self::gpu_hosted()),
            _ => Err(PolicyError::UnknownPreset(name.to_string())),
        }
    }

    pub fn params(&self, tier: Tier) -> TierParams {
        match tier {
            Tier::Standard => self.standard,
            Tier::Premium => self.premium,
        }
    }

    /// Premium must never be cheaper than standard.
    pub fn validate(&self) -> Result<(), PolicyError> {
        for (tier, params) in [(Tier::Standard, self.standard), (Tier::Premium, self.premium)] {
            if params.inference_steps == 0 {
                return Err(PolicyError::InvalidTable(format!(
                    "{tier} inference_steps must be at least 1"
                )));
            }
            if !params.style_scale.is_finite() || !(0.0..=1.0).contains(&params.style_scale) {
                return Err(PolicyError::InvalidTable(format!(
                    "{tier} style_scale must be within [0, 1], got {}",
                    params.style_scale
                )));
            }
        }

        if self.premium.inference_steps < self.standard.inference_steps {
            return Err(PolicyError::InvalidTable(format!(
                "premium inference_steps ({}) below standard ({})",
                self.premium.inference_steps, self.standard.inference_steps
            )));
        }
        if self.premium.style_scale < self.standard.style_scale {
            return Err(PolicyError::InvalidTable(format!(
                "premium style_scale ({}) below standard ({})",
                self.premium.style_scale, self.standard.style_scale
            )));
        }
        Ok(())
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::persistent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_parses_case_insensitively() {
        assert_eq!("premium".parse::<Tier>().unwrap(), Tier::Premium);
        assert_eq!(" Standard ".parse::<Tier>().unwrap(), Tier::Standard);
        assert_eq!("PREMIUM".parse::<Tier>().unwrap(), Tier::Premium);
        assert!(matches!(
            "gold".parse::<Tier>(),
            Err(PolicyError::UnknownTier(t)) if t == "gold"
        ));
    }

    #[test]
    fn tier_from_flag() {
        assert_eq!(Tier::from_premium_flag(true), Tier::Premium);
        assert_eq!(Tier::from_premium_flag(false), Tier::Standard);
        assert!(Tier::Premium.is_premium());
        assert!(!Tier::default().is_premium());
    }

    #[test]
    fn tier_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Premium).unwrap(), "\"premium\"");
        let tier: Tier = serde_json::from_str("\"standard\"").unwrap();
        assert_eq!(tier, Tier::Standard);
    }

    #[test]
    fn presets_match_deployments() {
        let persistent = TierTable::persistent();
        assert_eq!(persistent.standard, TierParams::new(30, 0.6));
        assert_eq!(persistent.premium, TierParams::new(50, 0.75));

        let gpu = TierTable::gpu_hosted();
        assert_eq!(gpu.standard, TierParams::new(25, 0.6));
        assert_eq!(gpu.premium, TierParams::new(30, 0.7));

        assert_eq!(TierTable::default(), persistent);
    }

    #[test]
    fn preset_lookup() {
        assert_eq!(TierTable::preset("persistent").unwrap(), TierTable::persistent());
        assert_eq!(TierTable::preset("GPU_hosted").unwrap(), TierTable::gpu_hosted());
        assert!(matches!(
            TierTable::preset("turbo"),
            Err(PolicyError::UnknownPreset(_))
        ));
    }

    #[test]
    fn presets_validate() {
        assert!(TierTable::persistent().validate().is_ok());
        assert!(TierTable::gpu_hosted().validate().is_ok());
    }

    #[test]
    fn premium_below_standard_is_rejected() {
        let table = TierTable {
            standard: TierParams::new(40, 0.6),
            premium: TierParams::new(30, 0.7),
        };
        assert!(matches!(table.validate(), Err(PolicyError::InvalidTable(_))));

        let table = TierTable {
            standard: TierParams::new(25, 0.8),
            premium: TierParams::new(30, 0.7),
        };
        assert!(matches!(table.validate(), Err(PolicyError::InvalidTable(_))));
    }

    #[test]
    fn degenerate_params_are_rejected() {
        let zero_steps = TierTable {
            standard: TierParams::new(0, 0.6),
            premium: TierParams::new(30, 0.7),
        };
        assert!(zero_steps.validate().is_err());

        let out_of_range = TierTable {
            standard: TierParams::new(25, 0.6),
            premium: TierParams::new(30, 1.5),
        };
        assert!(out_of_range.validate().is_err());

        let nan = TierTable {
            standard: TierParams::new(25, f32::NAN),
            premium: TierParams::new(30, 0.7),
        };
        assert!(nan.validate().is_err());
    }
}
