//! Simulated opponents
//!
//! Opponents are purely cosmetic: they random-walk while the human walks
//! and stand still otherwise. Nothing here feeds back into the session
//! store.

use rand::Rng;
use tracing::debug;
use walkrace_config::OpponentConfig;
use walkrace_util::PlayerId;

use crate::Player;

/// What one opponent did during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpponentMove {
    pub player_id: PlayerId,
    pub walked: u64,
}

/// Drives every non-human player
pub struct OpponentSimulator<R> {
    rng: R,
    config: OpponentConfig,
}

impl<R: Rng> OpponentSimulator<R> {
    pub fn new(config: OpponentConfig, rng: R) -> Self {
        Self { rng, config }
    }

    pub fn config(&self) -> &OpponentConfig {
        &self.config
    }

    /// Advance every opponent by one tick.
    ///
    /// While the human is walking each opponent independently walks with
    /// the configured probability. Otherwise everyone idles in place.
    /// Returns the opponents that moved.
    pub fn tick(&mut self, players: &mut [Player], human_active: bool) -> Vec<OpponentMove> {
        let mut moves = Vec::new();

        for player in players.iter_mut().filter(|p| !p.is_human) {
            if !human_active {
                player.is_walking = false;
                continue;
            }

            player.is_walking = self.rng.gen_bool(self.config.walk_probability);
            if player.is_walking {
                let walked = if self.config.increment.is_empty() {
                    self.config.increment.start
                } else {
                    self.rng.gen_range(self.config.increment.clone())
                };
                player.steps = player.steps.saturating_add(walked);
                moves.push(OpponentMove {
                    player_id: player.id.clone(),
                    walked,
                });
            }
        }

        debug!(moved = moves.len(), human_active, "Opponents ticked");
        moves
    }

    /// Zero every player's steps and walking flag
    pub fn reset(&mut self, players: &mut [Player]) {
        for player in players.iter_mut() {
            player.steps = 0;
            player.is_walking = false;
        }
    }
}
