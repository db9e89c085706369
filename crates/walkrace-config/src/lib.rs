//! Configuration parsing and validation for walkrace
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Race roster and scoring
//! - Opponent, chat and simulated pedometer tuning
//! - Validation with clear error messages

mod game;
mod schema;
mod validation;

pub use game::*;
pub use schema::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for walkrace_util::WalkraceError {
    fn from(e: ConfigError) -> Self {
        walkrace_util::WalkraceError::config(e.to_string())
    }
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<GameConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration, falling back to defaults when the file does not exist
pub fn load_config_or_default(path: impl AsRef<Path>) -> ConfigResult<GameConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!(path = %path.display(), "No config file, using defaults");
        return Ok(GameConfig::default());
    }
    load_config(path)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<GameConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(GameConfig::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use walkrace_api::{PermissionStatus, StepAccounting};

    #[test]
    fn config_error_converts_to_core_error() {
        let err: walkrace_util::WalkraceError = parse_config("config_version = 9").unwrap_err().into();
        assert_eq!(err.to_string(), "Configuration error: Unsupported config version: 9");
    }

    #[test]
    fn parse_minimal_config() {
        let config = parse_config("config_version = 1").unwrap();
        assert_eq!(config.race.players.len(), 4);
        assert_eq!(config.race.goal_steps, 1000);
    }

    #[test]
    fn parse_full_config() {
        let content = r#"
            config_version = 1

            [service]
            data_dir = "/tmp/walkrace-test"
            seed = 7
            accounting = "session_cumulative"

            [race]
            goal_steps = 500
            winner_points_min = 10
            winner_points_max = 20

            [[race.players]]
            id = "me"
            name = "Sam"
            human = true

            [[race.players]]
            id = "bot"
            name = "Robo"

            [opponents]
            tick_seconds = 1
            walk_probability = 1.0

            [chat]
            silence_probability = 0.0
            cooldown_min_ms = 100
            cooldown_max_ms = 100

            [pedometer]
            initial_permission = "denied"
            grant_on_request = false
        "#;

        let config = parse_config(content).unwrap();
        assert_eq!(config.service.seed, Some(7));
        assert_eq!(config.service.accounting, StepAccounting::SessionCumulative);
        assert_eq!(config.race.goal_steps, 500);
        assert_eq!(config.race.winner_points, 10..20);
        assert_eq!(config.race.players.len(), 2);
        assert_eq!(config.race.human().unwrap().name, "Sam");
        assert_eq!(config.opponents.tick, Duration::from_secs(1));
        assert_eq!(config.chat.cooldown_min, config.chat.cooldown_max);
        assert_eq!(config.pedometer.initial_permission, PermissionStatus::Denied);
        assert!(!config.pedometer.grant_on_request);
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_values() {
        let content = r#"
            config_version = 1
            [chat]
            emoji_probability = 2.0
        "#;
        let result = parse_config(content);
        assert!(matches!(result, Err(ConfigError::ValidationFailed { errors }) if errors.len() == 1));
    }

    #[test]
    fn load_from_disk_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config_or_default(&path).unwrap();
        assert_eq!(config.race.goal_steps, 1000);
        assert!(matches!(load_config(&path), Err(ConfigError::ReadError(_))));

        std::fs::write(&path, "config_version = 1\n[race]\ngoal_steps = 250\n").unwrap();
        assert_eq!(load_config(&path).unwrap().race.goal_steps, 250);
    }
}
