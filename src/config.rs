use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EngineError, Result};

pub const DEFAULT_SIZE: usize = 4;
/// Spawned tiles are 2 or 4 with equal odds unless configured otherwise.
pub const DEFAULT_FOUR_PROBABILITY: f64 = 0.5;

/// What `Env2048::step` hands back as reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RewardMode {
    /// The running game score after the step.
    #[default]
    Cumulative,
    /// Only the score gained by the step.
    Delta,
}

/// Game and environment settings.
///
/// Missing fields fall back to their defaults when deserialized:
/// ```
/// use gym_2048::config::{GameConfig, RewardMode};
/// let cfg = GameConfig::from_json(r#"{ "size": 5, "reward": "delta" }"#).unwrap();
/// assert_eq!(cfg.size, 5);
/// assert_eq!(cfg.reward, RewardMode::Delta);
/// assert_eq!(cfg.four_probability, 0.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub size: usize,
    pub four_probability: f64,
    pub reward: RewardMode,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            size: DEFAULT_SIZE,
            four_probability: DEFAULT_FOUR_PROBABILITY,
            reward: RewardMode::default(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<()> {
        validate_size(self.size)?;
        validate_four_probability(self.four_probability)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self> {
        let cfg: GameConfig = serde_json::from_str(text)
            .map_err(|e| EngineError::InvalidArgument(format!("bad config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidArgument(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }
}

/// A board needs room for the two starting tiles.
pub(crate) fn validate_size(size: usize) -> Result<()> {
    if size < 2 {
        return Err(EngineError::InvalidArgument(format!(
            "board size must be at least 2, got {size}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_four_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(EngineError::InvalidArgument(format!(
            "four_probability {p} is outside [0, 1]"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.size, 4);
        assert_eq!(cfg.reward, RewardMode::Cumulative);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_small_boards_and_bad_probabilities() {
        for size in [0, 1] {
            let cfg = GameConfig {
                size,
                ..GameConfig::default()
            };
            assert!(matches!(cfg.validate(), Err(EngineError::InvalidArgument(_))));
        }
        for p in [-0.1, 1.1, f64::NAN] {
            let cfg = GameConfig {
                four_probability: p,
                ..GameConfig::default()
            };
            assert!(cfg.validate().is_err());
        }
    }

    #[test]
    fn from_json_validates() {
        assert!(GameConfig::from_json(r#"{ "size": 1 }"#).is_err());
        assert!(GameConfig::from_json("not json").is_err());
        let cfg = GameConfig::from_json(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.size, DEFAULT_SIZE);
    }

    #[test]
    fn roundtrips_through_json() {
        let cfg = GameConfig {
            size: 3,
            four_probability: 0.1,
            reward: RewardMode::Delta,
            seed: Some(42),
        };
        let text = serde_json::to_string(&cfg).unwrap();
        assert_eq!(GameConfig::from_json(&text).unwrap(), cfg);
    }
}
