//! Match configuration.
//!
//! Every field has a default, so a JSON config only needs the keys it wants
//! to override:
//!
//! ```json
//! { "seed": 42, "combat": "continual", "max_rounds": 60 }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolve::combat::{CombatMode, CombatOdds};

/// Errors detected before any turn is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown combat mode '{0}'")]
    UnknownCombatMode(String),

    #[error("{name} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { name: &'static str, value: f64 },

    #[error("max_rounds must be at least 1")]
    NoRounds,

    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunable rules of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seed for the match's random stream. `None` draws one from entropy.
    pub seed: Option<u64>,
    /// Base allotment of armies per round.
    pub starting_armies: u32,
    /// The game ends once the round number exceeds this.
    pub max_rounds: u32,
    /// Regions each player claims during setup.
    pub starting_regions_per_player: usize,
    pub combat: CombatMode,
    pub odds: CombatOdds,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            seed: None,
            starting_armies: 5,
            max_rounds: 100,
            starting_regions_per_player: 3,
            combat: CombatMode::default(),
            odds: CombatOdds::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the combat mode from its name.
    pub fn set_combat_mode(&mut self, name: &str) -> Result<(), ConfigError> {
        self.combat = name.parse().map_err(ConfigError::UnknownCombatMode)?;
        Ok(())
    }

    /// Checks ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("defender_destroy_chance", self.odds.defender_destroy_chance)?;
        check_probability("attacker_destroy_chance", self.odds.attacker_destroy_chance)?;
        if self.max_rounds == 0 {
            return Err(ConfigError::NoRounds);
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ProbabilityOutOfRange { name, value })
    }
}
