//! Event types for core -> presentation streaming

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use walkrace_util::SessionId;

use crate::{
    ChatLine, Notice, PlayerView, SessionSummary, SessionView, WinnerAnnouncement, API_VERSION,
};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: walkrace_util::now(),
            payload,
        }
    }
}

/// All possible events from the core to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Full session view (sent on request and after major changes)
    StateChanged(SessionView),

    /// A walking session started
    SessionStarted {
        session_id: SessionId,
        started_at: DateTime<Local>,
    },

    /// A step update was accepted
    StepsUpdated { session_steps: u64, daily_steps: u64 },

    /// The walking session stopped
    SessionStopped(SessionSummary),

    /// Starting was refused; show the notice to the user
    NoticeRaised(Notice),

    /// Race standings changed (opponent tick or human progress)
    StandingsChanged { players: Vec<PlayerView> },

    /// A player said something
    ChatPosted(ChatLine),

    /// Someone reached the race goal
    WinnerDeclared(WinnerAnnouncement),

    /// The daily counter was reset
    DailyReset,

    /// The service is shutting down
    Shutdown,
}
