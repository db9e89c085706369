//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use walkrace_api::{PermissionStatus, StepAccounting};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Driver-level settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Race roster and scoring
    #[serde(default)]
    pub race: RawRaceConfig,

    /// Simulated opponent behavior
    #[serde(default)]
    pub opponents: RawOpponentConfig,

    /// Chat banter tuning
    #[serde(default)]
    pub chat: RawChatConfig,

    /// Simulated pedometer used by the headless driver
    #[serde(default)]
    pub pedometer: RawPedometerConfig,
}

/// Driver-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Data directory for the totals store
    pub data_dir: Option<PathBuf>,

    /// Seed for every random source; entropy when absent
    pub seed: Option<u64>,

    /// How pedometer values feed the daily and grand totals
    pub accounting: Option<StepAccounting>,
}

/// Race settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRaceConfig {
    /// Steps a player needs to win
    pub goal_steps: Option<u64>,

    /// Steps that fill the walking path map
    pub path_max_steps: Option<u64>,

    /// Daily step goal shown on the stats panel
    pub daily_goal_steps: Option<u64>,

    /// Inclusive lower bound of the winner's points award
    pub winner_points_min: Option<u32>,

    /// Exclusive upper bound of the winner's points award
    pub winner_points_max: Option<u32>,

    /// Roster; the built-in four-player roster when absent
    pub players: Option<Vec<RawPlayer>>,
}

/// Raw roster entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawPlayer {
    /// Unique stable ID
    pub id: String,

    /// Display name
    pub name: String,

    /// Whether this player is driven by the pedometer
    #[serde(default)]
    pub human: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawOpponentConfig {
    pub tick_seconds: Option<u64>,
    pub walk_probability: Option<f64>,
    /// Inclusive
    pub min_increment: Option<u64>,
    /// Exclusive
    pub max_increment: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawChatConfig {
    pub tick_seconds: Option<u64>,
    pub cooldown_min_ms: Option<u64>,
    pub cooldown_max_ms: Option<u64>,
    pub silence_probability: Option<f64>,
    pub emoji_probability: Option<f64>,
    pub history_limit: Option<usize>,
    /// Chance per chat tick that a bystander reacts to the latest line
    pub reaction_probability: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPedometerConfig {
    /// Whether the simulated device reports step counting support
    pub available: Option<bool>,

    /// Permission the simulated device starts with
    pub initial_permission: Option<PermissionStatus>,

    /// Whether a permission request is granted
    pub grant_on_request: Option<bool>,

    /// Interval between cumulative count deliveries
    pub update_interval_ms: Option<u64>,

    /// Inclusive
    pub min_steps_per_update: Option<u64>,

    /// Exclusive
    pub max_steps_per_update: Option<u64>,
}
