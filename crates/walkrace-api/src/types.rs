//! Shared types for the walkrace presentation API

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use walkrace_util::{PlayerId, SessionId};

/// Permission status as reported by the pedometer service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Motion/fitness permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PedometerPermission {
    pub status: PermissionStatus,
    /// Whether the OS will still show a permission prompt
    pub can_ask_again: bool,
}

impl PedometerPermission {
    pub fn granted() -> Self {
        Self {
            status: PermissionStatus::Granted,
            can_ask_again: true,
        }
    }

    pub fn denied(can_ask_again: bool) -> Self {
        Self {
            status: PermissionStatus::Denied,
            can_ask_again,
        }
    }

    pub fn undetermined() -> Self {
        Self {
            status: PermissionStatus::Undetermined,
            can_ask_again: true,
        }
    }

    pub fn is_granted(&self) -> bool {
        self.status == PermissionStatus::Granted
    }

    /// Denied and the OS will not prompt again; only Settings can fix it
    pub fn is_permanently_denied(&self) -> bool {
        self.status == PermissionStatus::Denied && !self.can_ask_again
    }
}

impl Default for PedometerPermission {
    fn default() -> Self {
        Self::undetermined()
    }
}

/// How a pedometer callback value feeds the daily and grand totals.
///
/// The session total is always replaced by the delivered value; only the
/// running totals differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAccounting {
    /// Add every delivered value to the totals as-is
    #[default]
    CallbackAsDelta,
    /// Add only the growth of the session's cumulative count
    SessionCumulative,
}

impl StepAccounting {
    /// Amount to add to the running totals when the session count moves
    /// from `previous` to `reported`
    pub fn increment(self, previous: u64, reported: u64) -> u64 {
        match self {
            StepAccounting::CallbackAsDelta => reported,
            StepAccounting::SessionCumulative => reported.saturating_sub(previous),
        }
    }
}

/// Historical step count for a date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepCount {
    pub steps: u64,
}

/// User-facing notice raised when a session cannot start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Step counting is not supported on this device
    Unavailable,
    /// Permission was refused
    PermissionDenied { can_ask_again: bool },
}

impl Notice {
    pub fn title(&self) -> &'static str {
        match self {
            Notice::Unavailable => "Pedometer Not Available",
            Notice::PermissionDenied { .. } => "Permission Required",
        }
    }

    pub fn body(&self) -> &'static str {
        match self {
            Notice::Unavailable => "Step counting is not available on this device.",
            Notice::PermissionDenied {
                can_ask_again: false,
            } => "Please enable motion & fitness permissions in Settings to track your steps.",
            Notice::PermissionDenied {
                can_ask_again: true,
            } => "Motion & fitness permission is needed to track your steps.",
        }
    }

    /// Whether the user has to leave the app to resolve this
    pub fn needs_settings_redirect(&self) -> bool {
        matches!(
            self,
            Notice::PermissionDenied {
                can_ask_again: false
            }
        )
    }
}

/// Progress toward the daily step goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyGoalProgress {
    pub goal: u64,
    /// Rounded percentage; may exceed 100
    pub percent: u64,
    pub remaining: u64,
}

impl DailyGoalProgress {
    pub fn compute(daily_steps: u64, goal: u64) -> Self {
        let percent = if goal == 0 {
            100
        } else {
            (daily_steps * 100 + goal / 2) / goal
        };

        Self {
            goal,
            percent,
            remaining: goal.saturating_sub(daily_steps),
        }
    }

    pub fn is_achieved(&self) -> bool {
        self.remaining == 0
    }
}

/// Derived session values for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Option<SessionId>,
    pub session_steps: u64,
    /// Whole seconds since the active session started
    pub session_duration_secs: u64,
    pub daily_steps: u64,
    pub total_steps: u64,
    pub is_tracking: bool,
    pub last_update: Option<DateTime<Local>>,
}

/// A race participant for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub name: String,
    pub steps: u64,
    pub is_walking: bool,
    pub is_human: bool,
    /// 1-based rank by steps
    pub rank: usize,
    /// Fraction of the path map covered, in `[0, 1]`
    pub path_progress: f64,
}

/// A chat bubble line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    pub id: String,
    pub player_id: PlayerId,
    pub message: String,
}

/// Race winner announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerAnnouncement {
    pub player_id: PlayerId,
    pub name: String,
    pub points: u32,
}

/// Summary of a finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub session_steps: u64,
    pub duration: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_serialization_matches_service_shape() {
        let perm = PedometerPermission::denied(false);
        let json = serde_json::to_string(&perm).unwrap();
        assert!(json.contains("\"denied\""));
        assert!(json.contains("can_ask_again"));
        assert!(perm.is_permanently_denied());
        assert!(!PedometerPermission::denied(true).is_permanently_denied());
    }

    #[test]
    fn default_permission_is_undetermined() {
        let perm = PedometerPermission::default();
        assert_eq!(perm.status, PermissionStatus::Undetermined);
        assert!(perm.can_ask_again);
        assert!(!perm.is_granted());
    }

    #[test]
    fn notice_text() {
        assert!(Notice::PermissionDenied { can_ask_again: false }.needs_settings_redirect());
        assert!(!Notice::Unavailable.needs_settings_redirect());
        assert!(Notice::PermissionDenied { can_ask_again: false }
            .body()
            .contains("Settings"));
    }

    #[test]
    fn accounting_increments() {
        assert_eq!(StepAccounting::CallbackAsDelta.increment(120, 340), 340);
        assert_eq!(StepAccounting::SessionCumulative.increment(120, 340), 220);
        // A pedometer restart never subtracts from the totals
        assert_eq!(StepAccounting::SessionCumulative.increment(340, 100), 0);
        assert_eq!(StepAccounting::default(), StepAccounting::CallbackAsDelta);
    }

    #[test]
    fn daily_goal_progress() {
        let p = DailyGoalProgress::compute(2_500, 10_000);
        assert_eq!(p.percent, 25);
        assert_eq!(p.remaining, 7_500);
        assert!(!p.is_achieved());

        let done = DailyGoalProgress::compute(12_000, 10_000);
        assert_eq!(done.percent, 120);
        assert_eq!(done.remaining, 0);
        assert!(done.is_achieved());
    }
}
