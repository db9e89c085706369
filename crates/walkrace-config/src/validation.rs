//! Configuration validation

use crate::game::*;
use crate::schema::{RawConfig, RawPlayer};
use std::collections::HashSet;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Player '{player_id}': {message}")]
    PlayerError { player_id: String, message: String },

    #[error("Duplicate player ID: {0}")]
    DuplicatePlayerId(String),

    #[error("Roster must contain exactly one human player, found {0}")]
    HumanCount(usize),

    #[error("Roster must contain at least two players, found {0}")]
    RosterTooSmall(usize),

    #[error("{field} must be within [0, 1], got {value}")]
    ProbabilityOutOfRange { field: String, value: f64 },

    #[error("{field}: minimum {min} must be below maximum {max}")]
    InvalidRange { field: String, min: u64, max: u64 },

    #[error("{0} must be greater than zero")]
    MustBePositive(String),
}

/// Validate a raw configuration, collecting every problem found
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(players) = &config.race.players {
        errors.extend(validate_roster(players));
    }

    let race = &config.race;
    positive(&mut errors, "race.goal_steps", race.goal_steps);
    positive(&mut errors, "race.path_max_steps", race.path_max_steps);
    positive(&mut errors, "race.daily_goal_steps", race.daily_goal_steps);
    half_open(
        &mut errors,
        "race.winner_points",
        race.winner_points_min
            .unwrap_or(DEFAULT_WINNER_POINTS.start)
            .into(),
        race.winner_points_max
            .unwrap_or(DEFAULT_WINNER_POINTS.end)
            .into(),
    );

    let opponents = &config.opponents;
    positive(&mut errors, "opponents.tick_seconds", opponents.tick_seconds);
    probability(
        &mut errors,
        "opponents.walk_probability",
        opponents.walk_probability,
    );
    half_open(
        &mut errors,
        "opponents.increment",
        opponents
            .min_increment
            .unwrap_or(DEFAULT_OPPONENT_INCREMENT.start),
        opponents
            .max_increment
            .unwrap_or(DEFAULT_OPPONENT_INCREMENT.end),
    );

    let chat = &config.chat;
    positive(&mut errors, "chat.tick_seconds", chat.tick_seconds);
    positive(
        &mut errors,
        "chat.history_limit",
        chat.history_limit.map(|n| n as u64),
    );
    probability(&mut errors, "chat.silence_probability", chat.silence_probability);
    probability(&mut errors, "chat.emoji_probability", chat.emoji_probability);
    probability(
        &mut errors,
        "chat.reaction_probability",
        chat.reaction_probability,
    );
    // A fixed window (min == max) is allowed
    let cooldown_min = chat.cooldown_min_ms.unwrap_or(DEFAULT_COOLDOWN_MIN_MS);
    let cooldown_max = chat.cooldown_max_ms.unwrap_or(DEFAULT_COOLDOWN_MAX_MS);
    if cooldown_min > cooldown_max {
        errors.push(ValidationError::InvalidRange {
            field: "chat.cooldown_ms".into(),
            min: cooldown_min,
            max: cooldown_max,
        });
    }

    let pedometer = &config.pedometer;
    positive(
        &mut errors,
        "pedometer.update_interval_ms",
        pedometer.update_interval_ms,
    );
    half_open(
        &mut errors,
        "pedometer.steps_per_update",
        pedometer
            .min_steps_per_update
            .unwrap_or(DEFAULT_STEPS_PER_UPDATE.start),
        pedometer
            .max_steps_per_update
            .unwrap_or(DEFAULT_STEPS_PER_UPDATE.end),
    );

    errors
}

fn validate_roster(players: &[RawPlayer]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if players.len() < 2 {
        errors.push(ValidationError::RosterTooSmall(players.len()));
    }

    let humans = players.iter().filter(|p| p.human).count();
    if humans != 1 {
        errors.push(ValidationError::HumanCount(humans));
    }

    let mut seen_ids = HashSet::new();
    for player in players {
        if !seen_ids.insert(&player.id) {
            errors.push(ValidationError::DuplicatePlayerId(player.id.clone()));
        }
        if player.id.trim().is_empty() {
            errors.push(ValidationError::PlayerError {
                player_id: player.id.clone(),
                message: "id must not be empty".into(),
            });
        }
        if player.name.trim().is_empty() {
            errors.push(ValidationError::PlayerError {
                player_id: player.id.clone(),
                message: "name must not be empty".into(),
            });
        }
    }

    errors
}

fn positive(errors: &mut Vec<ValidationError>, field: &str, value: Option<u64>) {
    if value == Some(0) {
        errors.push(ValidationError::MustBePositive(field.into()));
    }
}

fn probability(errors: &mut Vec<ValidationError>, field: &str, value: Option<f64>) {
    match value {
        Some(value) if !(0.0..=1.0).contains(&value) => {
            errors.push(ValidationError::ProbabilityOutOfRange {
                field: field.into(),
                value,
            });
        }
        _ => {}
    }
}

fn half_open(errors: &mut Vec<ValidationError>, field: &str, min: u64, max: u64) {
    if min >= max {
        errors.push(ValidationError::InvalidRange {
            field: field.into(),
            min,
            max,
        });
    }
}
