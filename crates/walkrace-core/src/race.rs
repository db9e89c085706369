//! Race roster and standings

use rand::Rng;
use std::ops::Range;
use tracing::info;
use walkrace_api::{PlayerView, WinnerAnnouncement};
use walkrace_config::RaceConfig;
use walkrace_util::PlayerId;

/// A race participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub steps: u64,
    pub is_walking: bool,
    pub is_human: bool,
}

/// The roster, the goal and who won
#[derive(Debug)]
pub struct Race {
    players: Vec<Player>,
    goal_steps: u64,
    path_max_steps: u64,
    winner_points: Range<u32>,
    winner: Option<WinnerAnnouncement>,
}

impl Race {
    pub fn new(config: &RaceConfig) -> Self {
        let players = config
            .players
            .iter()
            .map(|p| Player {
                id: p.id.clone(),
                name: p.name.clone(),
                steps: 0,
                is_walking: false,
                is_human: p.is_human,
            })
            .collect();

        Self {
            players,
            goal_steps: config.goal_steps,
            path_max_steps: config.path_max_steps,
            winner_points: config.winner_points.clone(),
            winner: None,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub fn goal_steps(&self) -> u64 {
        self.goal_steps
    }

    pub fn human(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_human)
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Mirror the session store into the human player. Returns whether
    /// anything changed.
    pub fn sync_human(&mut self, steps: u64, walking: bool) -> bool {
        match self.players.iter_mut().find(|p| p.is_human) {
            Some(human) if human.steps != steps || human.is_walking != walking => {
                human.steps = steps;
                human.is_walking = walking;
                true
            }
            _ => false,
        }
    }

    /// 1-based rank of each roster slot, by steps descending. Ties keep
    /// roster order.
    pub fn ranks(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.players.len()).collect();
        order.sort_by(|&a, &b| self.players[b].steps.cmp(&self.players[a].steps));

        let mut ranks = vec![0; self.players.len()];
        for (position, index) in order.into_iter().enumerate() {
            ranks[index] = position + 1;
        }
        ranks
    }

    pub fn rank_of(&self, id: &PlayerId) -> Option<usize> {
        let index = self.players.iter().position(|p| &p.id == id)?;
        self.ranks().get(index).copied()
    }

    /// Players with ranks, leader first
    pub fn standings(&self) -> Vec<PlayerView> {
        let ranks = self.ranks();
        let mut views: Vec<PlayerView> = self
            .players
            .iter()
            .zip(ranks)
            .map(|(p, rank)| PlayerView {
                player_id: p.id.clone(),
                name: p.name.clone(),
                steps: p.steps,
                is_walking: p.is_walking,
                is_human: p.is_human,
                rank,
                path_progress: self.path_progress(p.steps),
            })
            .collect();
        views.sort_by_key(|v| v.rank);
        views
    }

    /// Combined progress of everyone toward the goal, in `[0, 1]`
    pub fn game_progress(&self) -> f64 {
        if self.players.is_empty() || self.goal_steps == 0 {
            return 0.0;
        }
        let walked: u64 = self.players.iter().map(|p| p.steps).sum();
        let needed = self.players.len() as f64 * self.goal_steps as f64;
        (walked as f64 / needed).min(1.0)
    }

    /// How far along the path map `steps` reaches, in `[0, 1]`
    pub fn path_progress(&self, steps: u64) -> f64 {
        if self.path_max_steps == 0 {
            return 1.0;
        }
        (steps as f64 / self.path_max_steps as f64).min(1.0)
    }

    /// Declare the first player at the goal, once per race
    pub fn check_winner<R: Rng>(&mut self, rng: &mut R) -> Option<WinnerAnnouncement> {
        if self.winner.is_some() {
            return None;
        }

        let player = self.players.iter().find(|p| p.steps >= self.goal_steps)?;
        let points = if self.winner_points.is_empty() {
            self.winner_points.start
        } else {
            rng.gen_range(self.winner_points.clone())
        };

        let announcement = WinnerAnnouncement {
            player_id: player.id.clone(),
            name: player.name.clone(),
            points,
        };
        info!(player_id = %player.id, points, "Race won");

        self.winner = Some(announcement.clone());
        Some(announcement)
    }

    pub fn winner(&self) -> Option<&WinnerAnnouncement> {
        self.winner.as_ref()
    }

    /// Everyone back to the start line
    pub fn reset(&mut self) {
        for player in &mut self.players {
            player.steps = 0;
            player.is_walking = false;
        }
        self.winner = None;
    }
}
