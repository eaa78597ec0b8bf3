//! # Configuration Management Module
//!
//! Runtime settings for the wasteland engine, loaded from a TOML file.
//!
//! ## Configuration Structure
//!
//! - [`GameConfig`] - Start location, exploration costs, resting, RNG seed, template directory
//! - [`CombatConfig`] - Style multipliers, stun and flee chances, victory rewards
//! - [`StorageConfig`] - Snapshot directory
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! Every section has defaults, so a partial file (or an empty one) is valid.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wasteland::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("wasteland.toml").await?;
//!     let config = Config::load("wasteland.toml").await?;
//!     println!("Saves go to {}", config.storage.save_dir);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [game]
//! start_location = "Rust Market"
//! explore_energy_cost = 10
//! encounter_chance_per_danger = 0.1
//!
//! [combat]
//! flee_chance = 0.5
//! reward_min = 10
//! reward_max = 50
//!
//! [storage]
//! save_dir = "./saves"
//!
//! [logging]
//! level = "info"
//! file = "wasteland.log"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Location a new character starts in
    pub start_location: String,
    pub starting_credits: u32,
    /// Energy spent per `explore`
    pub explore_energy_cost: i32,
    /// Encounter probability added per point of location danger
    pub encounter_chance_per_danger: f64,
    /// Ceiling on the encounter probability
    pub max_encounter_chance: f64,
    pub rest_health: i32,
    pub rest_energy: i32,
    /// Fixed RNG seed for reproducible sessions. Unset means seeded from entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rng_seed: Option<u64>,
    /// Directory holding template JSON files. Unset means built-in templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_dir: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_location: crate::game::seeds::START_LOCATION.to_string(),
            starting_credits: 25,
            explore_energy_cost: 10,
            encounter_chance_per_danger: 0.1,
            max_encounter_chance: 0.9,
            rest_health: 25,
            rest_energy: 20,
            rng_seed: None,
            template_dir: None,
        }
    }
}

impl GameConfig {
    /// Encounter probability at `danger_level`, within `[0, max_encounter_chance]`.
    pub fn encounter_chance(&self, danger_level: u8) -> f64 {
        let cap = self.max_encounter_chance.clamp(0.0, 1.0);
        (f64::from(danger_level) * self.encounter_chance_per_danger).clamp(0.0, cap)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CombatConfig {
    /// Damage multiplier for Aggressive attackers
    pub aggressive_multiplier: f64,
    /// Defense multiplier for Defensive defenders
    pub defensive_multiplier: f64,
    /// Chance per Technical attack to stun the defender
    pub stun_chance: f64,
    pub stun_duration_secs: i64,
    pub stun_agility_penalty: i32,
    pub flee_chance: f64,
    /// Inclusive credit reward range for a victory
    pub reward_min: u32,
    pub reward_max: u32,
    /// Experience per enemy level on victory
    pub experience_per_level: u32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            aggressive_multiplier: 1.2,
            defensive_multiplier: 1.2,
            stun_chance: 0.3,
            stun_duration_secs: 2,
            stun_agility_penalty: -2,
            flee_chance: 0.5,
            reward_min: 10,
            reward_max: 50,
            experience_per_level: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub save_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: "./saves".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("wasteland.log".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub combat: CombatConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        for (name, p) in [
            ("combat.stun_chance", self.combat.stun_chance),
            ("combat.flee_chance", self.combat.flee_chance),
            ("game.max_encounter_chance", self.game.max_encounter_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(anyhow!("{} must be between 0 and 1 (got {})", name, p));
            }
        }
        if self.combat.reward_min > self.combat.reward_max {
            return Err(anyhow!(
                "combat.reward_min ({}) exceeds combat.reward_max ({})",
                self.combat.reward_min,
                self.combat.reward_max
            ));
        }
        if self.game.explore_energy_cost < 0 {
            return Err(anyhow!("game.explore_energy_cost must not be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_combat_defaults_match_rules() {
        let combat = CombatConfig::default();
        assert_eq!(combat.aggressive_multiplier, 1.2);
        assert_eq!(combat.defensive_multiplier, 1.2);
        assert_eq!(combat.stun_chance, 0.3);
        assert_eq!(combat.stun_duration_secs, 2);
        assert_eq!(combat.stun_agility_penalty, -2);
        assert_eq!(combat.flee_chance, 0.5);
    }

    #[test]
    fn test_encounter_chance_is_capped() {
        let game = GameConfig::default();
        assert_eq!(game.encounter_chance(0), 0.0);
        assert!((game.encounter_chance(4) - 0.4).abs() < 1e-9);
        assert_eq!(game.encounter_chance(200), 0.9);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str("[combat]\nflee_chance = 0.25\n").unwrap();
        assert_eq!(config.combat.flee_chance, 0.25);
        assert_eq!(config.combat.reward_max, 50);
        assert_eq!(config.game, GameConfig::default());
        assert_eq!(config.storage.save_dir, "./saves");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());
        config.combat.stun_chance = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.combat.reward_min = 100;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_create_default_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wasteland.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[tokio::test]
    async fn test_load_missing_file_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(Config::load(path.to_str().unwrap()).await.is_err());
    }
}
