//! Walking session record

use chrono::{DateTime, Local};
use std::time::Duration;
use walkrace_util::{MonotonicInstant, SessionId};

/// One start-to-stop walking session
#[derive(Debug, Clone)]
pub struct WalkingSession {
    pub id: SessionId,

    /// Wall-clock start time (for display/logging)
    pub start_time: DateTime<Local>,

    /// Monotonic start time (for duration)
    pub started_at_mono: MonotonicInstant,

    /// Set exactly once, when the session stops
    pub end_time: Option<DateTime<Local>>,

    /// Most recent cumulative count reported since the session started
    pub total_steps: u64,

    /// The store's lifetime total when the session was created
    pub starting_step_count: u64,

    pub is_active: bool,
}

impl WalkingSession {
    pub fn new(
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
        starting_step_count: u64,
    ) -> Self {
        Self {
            id: SessionId::from_start(&now),
            start_time: now,
            started_at_mono: now_mono,
            end_time: None,
            total_steps: 0,
            starting_step_count,
            is_active: true,
        }
    }

    /// Time walked so far
    pub fn duration_so_far(&self, now_mono: MonotonicInstant) -> Duration {
        now_mono.duration_since(self.started_at_mono)
    }

    /// Mark the session finished
    pub fn finish(&mut self, now: DateTime<Local>) {
        if self.is_active {
            self.is_active = false;
            self.end_time = Some(now);
        }
    }
}

/// Result of stopping a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopResult {
    pub session_id: SessionId,
    pub session_steps: u64,
    pub duration: Duration,
}
