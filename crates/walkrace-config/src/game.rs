//! Validated game configuration

use crate::schema::{
    RawChatConfig, RawConfig, RawOpponentConfig, RawPedometerConfig, RawPlayer, RawRaceConfig,
    RawServiceConfig,
};
use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;
use walkrace_api::{PermissionStatus, StepAccounting};
use walkrace_util::{PlayerId, default_data_dir};

pub const DEFAULT_GOAL_STEPS: u64 = 1000;
pub const DEFAULT_PATH_MAX_STEPS: u64 = 2000;
pub const DEFAULT_DAILY_GOAL_STEPS: u64 = 10_000;
pub const DEFAULT_WINNER_POINTS: Range<u32> = 100..150;

pub const DEFAULT_OPPONENT_TICK_SECS: u64 = 3;
pub const DEFAULT_WALK_PROBABILITY: f64 = 0.7;
pub const DEFAULT_OPPONENT_INCREMENT: Range<u64> = 10..60;

pub const DEFAULT_CHAT_TICK_SECS: u64 = 3;
pub const DEFAULT_COOLDOWN_MIN_MS: u64 = 2000;
pub const DEFAULT_COOLDOWN_MAX_MS: u64 = 5000;
pub const DEFAULT_SILENCE_PROBABILITY: f64 = 0.6;
pub const DEFAULT_EMOJI_PROBABILITY: f64 = 0.3;
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
pub const DEFAULT_REACTION_PROBABILITY: f64 = 0.2;

pub const DEFAULT_PEDOMETER_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_STEPS_PER_UPDATE: Range<u64> = 1..4;

/// Validated configuration ready for use by the core and driver
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    pub service: ServiceConfig,
    pub race: RaceConfig,
    pub opponents: OpponentConfig,
    pub chat: ChatConfig,
    pub pedometer: PedometerConfig,
}

impl GameConfig {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            race: RaceConfig::from_raw(raw.race),
            opponents: OpponentConfig::from_raw(raw.opponents),
            chat: ChatConfig::from_raw(raw.chat),
            pedometer: PedometerConfig::from_raw(raw.pedometer),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub data_dir: PathBuf,
    pub seed: Option<u64>,
    pub accounting: StepAccounting,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            data_dir: raw.data_dir.unwrap_or_else(default_data_dir),
            seed: raw.seed,
            accounting: raw.accounting.unwrap_or_default(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_raw(RawServiceConfig::default())
    }
}

/// A roster entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub id: PlayerId,
    pub name: String,
    pub is_human: bool,
}

impl PlayerConfig {
    pub fn human(id: &str, name: &str) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.to_string(),
            is_human: true,
        }
    }

    pub fn opponent(id: &str, name: &str) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.to_string(),
            is_human: false,
        }
    }

    fn from_raw(raw: RawPlayer) -> Self {
        Self {
            id: PlayerId::new(raw.id),
            name: raw.name,
            is_human: raw.human,
        }
    }
}

/// The built-in roster: one walker and three simulated friends
pub fn default_roster() -> Vec<PlayerConfig> {
    vec![
        PlayerConfig::human("player", "Hailey"),
        PlayerConfig::opponent("ai1", "Buddy"),
        PlayerConfig::opponent("ai2", "Whiskers"),
        PlayerConfig::opponent("ai3", "Alex"),
    ]
}

#[derive(Debug, Clone)]
pub struct RaceConfig {
    pub goal_steps: u64,
    pub path_max_steps: u64,
    pub daily_goal_steps: u64,
    /// Half-open range the winner's points are drawn from
    pub winner_points: Range<u32>,
    pub players: Vec<PlayerConfig>,
}

impl RaceConfig {
    fn from_raw(raw: RawRaceConfig) -> Self {
        Self {
            goal_steps: raw.goal_steps.unwrap_or(DEFAULT_GOAL_STEPS),
            path_max_steps: raw.path_max_steps.unwrap_or(DEFAULT_PATH_MAX_STEPS),
            daily_goal_steps: raw.daily_goal_steps.unwrap_or(DEFAULT_DAILY_GOAL_STEPS),
            winner_points: raw.winner_points_min.unwrap_or(DEFAULT_WINNER_POINTS.start)
                ..raw.winner_points_max.unwrap_or(DEFAULT_WINNER_POINTS.end),
            players: raw
                .players
                .map(|p| p.into_iter().map(PlayerConfig::from_raw).collect())
                .unwrap_or_else(default_roster),
        }
    }

    /// The pedometer-driven player
    pub fn human(&self) -> Option<&PlayerConfig> {
        self.players.iter().find(|p| p.is_human)
    }
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self::from_raw(RawRaceConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct OpponentConfig {
    pub tick: Duration,
    pub walk_probability: f64,
    /// Half-open range of steps gained per walking tick
    pub increment: Range<u64>,
}

impl OpponentConfig {
    fn from_raw(raw: RawOpponentConfig) -> Self {
        Self {
            tick: Duration::from_secs(raw.tick_seconds.unwrap_or(DEFAULT_OPPONENT_TICK_SECS)),
            walk_probability: raw.walk_probability.unwrap_or(DEFAULT_WALK_PROBABILITY),
            increment: raw.min_increment.unwrap_or(DEFAULT_OPPONENT_INCREMENT.start)
                ..raw.max_increment.unwrap_or(DEFAULT_OPPONENT_INCREMENT.end),
        }
    }
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self::from_raw(RawOpponentConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub tick: Duration,
    pub cooldown_min: Duration,
    pub cooldown_max: Duration,
    pub silence_probability: f64,
    pub emoji_probability: f64,
    pub history_limit: usize,
    pub reaction_probability: f64,
}

impl ChatConfig {
    fn from_raw(raw: RawChatConfig) -> Self {
        Self {
            tick: Duration::from_secs(raw.tick_seconds.unwrap_or(DEFAULT_CHAT_TICK_SECS)),
            cooldown_min: Duration::from_millis(
                raw.cooldown_min_ms.unwrap_or(DEFAULT_COOLDOWN_MIN_MS),
            ),
            cooldown_max: Duration::from_millis(
                raw.cooldown_max_ms.unwrap_or(DEFAULT_COOLDOWN_MAX_MS),
            ),
            silence_probability: raw
                .silence_probability
                .unwrap_or(DEFAULT_SILENCE_PROBABILITY),
            emoji_probability: raw.emoji_probability.unwrap_or(DEFAULT_EMOJI_PROBABILITY),
            history_limit: raw.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT),
            reaction_probability: raw
                .reaction_probability
                .unwrap_or(DEFAULT_REACTION_PROBABILITY),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::from_raw(RawChatConfig::default())
    }
}

/// Behavior of the simulated pedometer the headless driver walks with
#[derive(Debug, Clone)]
pub struct PedometerConfig {
    pub available: bool,
    pub initial_permission: PermissionStatus,
    pub grant_on_request: bool,
    pub update_interval: Duration,
    pub steps_per_update: Range<u64>,
}

impl PedometerConfig {
    fn from_raw(raw: RawPedometerConfig) -> Self {
        Self {
            available: raw.available.unwrap_or(true),
            initial_permission: raw
                .initial_permission
                .unwrap_or(PermissionStatus::Undetermined),
            grant_on_request: raw.grant_on_request.unwrap_or(true),
            update_interval: Duration::from_millis(
                raw.update_interval_ms.unwrap_or(DEFAULT_PEDOMETER_INTERVAL_MS),
            ),
            steps_per_update: raw
                .min_steps_per_update
                .unwrap_or(DEFAULT_STEPS_PER_UPDATE.start)
                ..raw
                    .max_steps_per_update
                    .unwrap_or(DEFAULT_STEPS_PER_UPDATE.end),
        }
    }
}

impl Default for PedometerConfig {
    fn default() -> Self {
        Self::from_raw(RawPedometerConfig::default())
    }
}
