//! # Configuration Management Module
//!
//! Centralized configuration for the Parlor bot: typed sections with serde
//! defaults, validation on load, and TOML persistence.
//!
//! ## Configuration Structure
//!
//! - [`BotConfig`] - Bot identity, owner, and operational log channel
//! - [`GatewayConfig`] - Generation gateway endpoint and retry policy
//! - [`StorageConfig`] - Data directory for the sled store
//! - [`GamesConfig`] - Per-game budgets and the idle reaper thresholds
//! - [`LoggingConfig`] - Log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use parlor::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     println!("Bot name: {}", config.bot.name);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration File Format
//!
//! ```toml
//! [bot]
//! name = "Parlor"
//! owner_id = 1
//!
//! [gateway]
//! api_url = "https://generate.example.com/v1/text"
//! api_key = ""
//! model = "fast-general"
//!
//! [storage]
//! data_dir = "./data"
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Bot identity and operational settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Display name the bot signs synthetic contributions with.
    pub name: String,
    /// Platform user id of the bot account itself.
    pub user_id: u64,
    /// Platform user id of the bot owner; the only account allowed to use
    /// maintenance and reset commands, and exempt from maintenance mode.
    pub owner_id: u64,
    /// Optional channel that receives operational log notices (game
    /// outcomes, admin actions, gateway failures). Disabled when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_channel: Option<u64>,
}

/// Generation gateway endpoint and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    /// Default sampling temperature for free-text prompts.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_gateway_timeout")]
    pub timeout_seconds: u64,
    /// Upper bound on attempts per logical generation call. Covers both
    /// rate-limit retries and shape-validation re-asks for word generation.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Fixed wait before retrying after a rate-limit response.
    #[serde(default = "default_rate_limit_backoff")]
    pub rate_limit_backoff_seconds: u64,
}

fn default_temperature() -> f32 {
    0.9
}

fn default_gateway_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    4
}

fn default_rate_limit_backoff() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

/// Budgets and timers for the game catalog. Defaults match the classic
/// rules; overriding them is mostly useful in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamesConfig {
    #[serde(default = "default_wordle_attempts")]
    pub wordle_max_attempts: u32,
    #[serde(default = "default_hangman_wrong")]
    pub hangman_max_wrong: u32,
    #[serde(default = "default_question_cap")]
    pub question_cap: u32,
    /// Shared sessions silent for longer than this get a synthetic move.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Period of the idle reaper sweep.
    #[serde(default = "default_reaper_period")]
    pub reaper_period_seconds: u64,
    /// Bounded wait for a two-truths selection before the game is discarded.
    #[serde(default = "default_truths_timeout")]
    pub truths_timeout_seconds: u64,
}

fn default_wordle_attempts() -> u32 {
    6
}

fn default_hangman_wrong() -> u32 {
    6
}

fn default_question_cap() -> u32 {
    20
}

fn default_idle_timeout() -> u64 {
    90
}

fn default_reaper_period() -> u64 {
    30
}

fn default_truths_timeout() -> u64 {
    180
}

impl Default for GamesConfig {
    fn default() -> Self {
        GamesConfig {
            wordle_max_attempts: default_wordle_attempts(),
            hangman_max_wrong: default_hangman_wrong(),
            question_cap: default_question_cap(),
            idle_timeout_seconds: default_idle_timeout(),
            reaper_period_seconds: default_reaper_period(),
            truths_timeout_seconds: default_truths_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub games: GamesConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| anyhow!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Persist the configuration back to a TOML file.
    pub async fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;
        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;
        Ok(())
    }

    /// Write a starter configuration file with defaults.
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        config.save(path).await
    }

    fn validate(&self) -> Result<()> {
        if self.bot.name.trim().is_empty() {
            return Err(anyhow!("bot.name cannot be empty"));
        }
        if self.bot.owner_id == 0 {
            return Err(anyhow!("bot.owner_id must be set"));
        }
        if self.gateway.api_url.trim().is_empty() {
            return Err(anyhow!("gateway.api_url cannot be empty"));
        }
        if self.gateway.max_attempts == 0 {
            return Err(anyhow!("gateway.max_attempts must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.gateway.temperature) {
            return Err(anyhow!("gateway.temperature must be within 0.0..=2.0"));
        }
        if self.storage.data_dir.trim().is_empty() {
            return Err(anyhow!("storage.data_dir cannot be empty"));
        }
        if self.games.wordle_max_attempts == 0 || self.games.hangman_max_wrong == 0 {
            return Err(anyhow!("game budgets must be at least 1"));
        }
        if self.games.question_cap == 0 {
            return Err(anyhow!("games.question_cap must be at least 1"));
        }
        if self.games.reaper_period_seconds == 0 {
            return Err(anyhow!("games.reaper_period_seconds must be at least 1"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bot: BotConfig {
                name: "Parlor".to_string(),
                user_id: 1,
                owner_id: 1,
                log_channel: None,
            },
            gateway: GatewayConfig {
                api_url: "https://generate.example.com/v1/text".to_string(),
                api_key: String::new(),
                model: "fast-general".to_string(),
                temperature: default_temperature(),
                timeout_seconds: default_gateway_timeout(),
                max_attempts: default_max_attempts(),
                rate_limit_backoff_seconds: default_rate_limit_backoff(),
            },
            storage: StorageConfig {
                data_dir: "./data".to_string(),
            },
            games: GamesConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.bot.name, config.bot.name);
        assert_eq!(parsed.games.question_cap, 20);
        assert_eq!(parsed.games.idle_timeout_seconds, 90);
    }

    #[test]
    fn missing_games_section_uses_defaults() {
        let toml_str = r#"
            [bot]
            name = "Parlor"
            user_id = 9
            owner_id = 42

            [gateway]
            api_url = "https://example.com/v1"
            api_key = "k"
            model = "fast"

            [storage]
            data_dir = "./data"

            [logging]
            level = "info"
        "#;
        let parsed: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(parsed.games.wordle_max_attempts, 6);
        assert_eq!(parsed.games.truths_timeout_seconds, 180);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn save_then_load_round_trips() {
        tokio_test::block_on(async {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("config.toml");
            let path = path.to_str().unwrap();

            let mut config = Config::default();
            config.bot.name = "Custom".to_string();
            config.games.question_cap = 12;
            config.save(path).await.unwrap();

            let loaded = Config::load(path).await.unwrap();
            assert_eq!(loaded.bot.name, "Custom");
            assert_eq!(loaded.games.question_cap, 12);
        });
    }

    #[test]
    fn rejects_zero_budgets() {
        let mut config = Config::default();
        config.games.question_cap = 0;
        assert!(config.validate().is_err());
        let mut config = Config::default();
        config.gateway.max_attempts = 0;
        assert!(config.validate().is_err());
    }
}
