//! Core events emitted by the game

use chrono::{DateTime, Local};
use walkrace_api::{ChatLine, Notice, PlayerView, WinnerAnnouncement};
use walkrace_util::SessionId;

use crate::StopResult;

/// Events emitted by the core game
#[derive(Debug, Clone)]
pub enum CoreEvent {
    /// A session started and step tracking was requested
    SessionStarted {
        session_id: SessionId,
        started_at: DateTime<Local>,
    },

    /// A pedometer update was accepted
    StepsUpdated { session_steps: u64, daily_steps: u64 },

    /// The session stopped and the totals were cleared
    SessionStopped(StopResult),

    /// The start attempt was refused by the gate
    NoticeRaised(Notice),

    /// Any player's step count or walking flag changed
    StandingsChanged { players: Vec<PlayerView> },

    /// A player said something
    ChatPosted(ChatLine),

    /// A player reached the race goal
    WinnerDeclared(WinnerAnnouncement),

    /// The daily step count was cleared
    DailyReset,
}
