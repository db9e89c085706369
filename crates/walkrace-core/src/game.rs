//! The walking race game
//!
//! Ties the session store, the gate, the race and its cosmetic simulators
//! together and reports what happened as [`CoreEvent`]s.

use chrono::{DateTime, Local};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkrace_api::{DailyGoalProgress, SessionView, StepCount};
use walkrace_config::GameConfig;
use walkrace_pedometer::{PedometerGateway, StepStream};
use walkrace_store::Store;
use walkrace_util::{MonotonicInstant, day_of};

use crate::{
    ChatGenerator, CoreEvent, GateOutcome, GateState, OpponentSimulator, PermissionGate, Race,
    SessionStore, StartDecision, StopDecision,
};

/// The game core
pub struct Game {
    gateway: Arc<dyn PedometerGateway>,
    session: SessionStore,
    gate: PermissionGate,
    race: Race,
    opponents: OpponentSimulator<ChaCha8Rng>,
    chat: ChatGenerator<ChaCha8Rng>,
    rng: ChaCha8Rng,
    reaction_probability: f64,
    daily_goal_steps: u64,
}

impl Game {
    /// Create a game, loading persisted totals from `store`
    pub fn new(
        config: &GameConfig,
        gateway: Arc<dyn PedometerGateway>,
        store: Arc<dyn Store>,
        now: DateTime<Local>,
    ) -> Self {
        let mut rng = match config.service.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let opponents_rng = ChaCha8Rng::seed_from_u64(rng.r#gen());
        let chat_rng = ChaCha8Rng::seed_from_u64(rng.r#gen());

        info!(
            players = config.race.players.len(),
            goal_steps = config.race.goal_steps,
            seeded = config.service.seed.is_some(),
            "Game initialized"
        );

        Self {
            session: SessionStore::open(gateway.clone(), store, config.service.accounting, now),
            gate: PermissionGate::new(gateway.clone()),
            gateway,
            race: Race::new(&config.race),
            opponents: OpponentSimulator::new(config.opponents.clone(), opponents_rng),
            chat: ChatGenerator::new(config.chat.clone(), chat_rng),
            rng,
            reaction_probability: config.chat.reaction_probability,
            daily_goal_steps: config.race.daily_goal_steps,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn gate(&self) -> &PermissionGate {
        &self.gate
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    pub fn chat(&self) -> &ChatGenerator<ChaCha8Rng> {
        &self.chat
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn snapshot(&self, now_mono: MonotonicInstant) -> SessionView {
        self.session.snapshot(now_mono)
    }

    pub fn daily_goal(&self) -> DailyGoalProgress {
        DailyGoalProgress::compute(self.session.daily_steps(), self.daily_goal_steps)
    }

    /// Steps the device itself recorded since the active session started.
    ///
    /// `None` when idle or when the history query fails.
    pub async fn device_steps_this_session(&self, now: DateTime<Local>) -> Option<StepCount> {
        let start = self.session.current_session().filter(|s| s.is_active)?.start_time;
        match self.gateway.step_count_between(start, now).await {
            Ok(count) => Some(count),
            Err(e) => {
                warn!(error = %e, "Failed to query step history");
                None
            }
        }
    }

    /// Query the pedometer's availability and permission
    pub async fn check_pedometer(&mut self) -> GateState {
        self.gate.check().await
    }

    /// Attempt to start walking.
    ///
    /// Returns the events to publish and, when tracking began, the step
    /// stream the caller should feed into [`Game::on_steps`].
    pub async fn start(
        &mut self,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> (Vec<CoreEvent>, Option<StepStream>) {
        match self
            .gate
            .request_start(&mut self.session, now, now_mono)
            .await
        {
            GateOutcome::Refused(notice) => (vec![CoreEvent::NoticeRaised(notice)], None),
            GateOutcome::Started(StartDecision::AlreadyActive) => (Vec::new(), None),
            GateOutcome::Started(StartDecision::Started { session_id, steps }) => {
                self.opponents.reset(self.race.players_mut());
                self.race.reset();
                self.chat.reset();
                self.race.sync_human(0, true);

                let events = vec![
                    CoreEvent::SessionStarted {
                        session_id,
                        started_at: now,
                    },
                    self.standings_event(),
                ];
                (events, steps)
            }
        }
    }

    /// Feed a cumulative pedometer count
    pub fn on_steps(&mut self, steps: u64, now: DateTime<Local>) -> Vec<CoreEvent> {
        if !self.session.update_steps(steps, now) {
            return Vec::new();
        }

        let mut events = vec![CoreEvent::StepsUpdated {
            session_steps: self.session.session_steps(),
            daily_steps: self.session.daily_steps(),
        }];

        if self.race.sync_human(self.session.session_steps(), true) {
            events.push(self.standings_event());
        }
        events.extend(self.check_winner());
        events
    }

    /// Stop walking and put everyone back at the start line
    pub fn stop(&mut self, now: DateTime<Local>, now_mono: MonotonicInstant) -> Vec<CoreEvent> {
        match self.session.stop_session(now, now_mono) {
            StopDecision::NoActiveSession => Vec::new(),
            StopDecision::Stopped(result) => {
                self.opponents.reset(self.race.players_mut());
                self.race.reset();
                self.chat.reset();
                vec![CoreEvent::SessionStopped(result), self.standings_event()]
            }
        }
    }

    /// One opponent simulation step
    pub fn opponent_tick(&mut self) -> Vec<CoreEvent> {
        let active = self.session.is_active();
        let was_walking = self
            .race
            .players()
            .iter()
            .any(|p| !p.is_human && p.is_walking);

        self.opponents.tick(self.race.players_mut(), active);

        let mut events = Vec::new();
        if active || was_walking {
            events.push(self.standings_event());
        }
        if active {
            events.extend(self.check_winner());
        }
        events
    }

    /// One round of chat: every player gets a chance to speak, and a
    /// bystander may answer
    pub fn chat_tick(&mut self, now_mono: MonotonicInstant) -> Vec<CoreEvent> {
        if !self.session.is_active() {
            return Vec::new();
        }

        let progress = self.race.game_progress();
        let total = self.race.players().len();
        let speakers: Vec<_> = self
            .race
            .players()
            .iter()
            .zip(self.race.ranks())
            .map(|(p, rank)| (p.id.clone(), rank))
            .collect();

        let mut events = Vec::new();
        for (player_id, rank) in &speakers {
            let Some(line) = self.chat.generate(player_id, progress, *rank, total, now_mono) else {
                continue;
            };
            debug!(player_id = %player_id, message = %line.message, "Chat line");
            events.push(CoreEvent::ChatPosted(line));

            if self.rng.gen_bool(self.reaction_probability) {
                let bystander = speakers.iter().map(|(id, _)| id).find(|id| *id != player_id);
                if let Some(reply) =
                    bystander.and_then(|id| self.chat.generate_reaction_to(player_id, id))
                {
                    events.push(CoreEvent::ChatPosted(reply));
                }
            }
        }
        events
    }

    pub fn reset_daily(&mut self) -> Vec<CoreEvent> {
        self.session.reset_daily();
        vec![CoreEvent::DailyReset]
    }

    /// Clear the daily count if the calendar day changed
    pub fn roll_over(&mut self, now: DateTime<Local>) -> Vec<CoreEvent> {
        if self.session.roll_over(day_of(&now)) {
            vec![CoreEvent::DailyReset]
        } else {
            Vec::new()
        }
    }

    fn standings_event(&self) -> CoreEvent {
        CoreEvent::StandingsChanged {
            players: self.race.standings(),
        }
    }

    fn check_winner(&mut self) -> Option<CoreEvent> {
        self.race
            .check_winner(&mut self.rng)
            .map(CoreEvent::WinnerDeclared)
    }
}
