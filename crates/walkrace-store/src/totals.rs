//! Persisted step totals

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Key the totals blob lives under
pub const TOTALS_KEY: &str = "walking-game-storage";

/// The subset of session store state that survives restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedTotals {
    pub daily_steps: u64,
    pub total_steps: u64,
    /// Calendar day `daily_steps` was counted on
    pub day: NaiveDate,
}

impl PersistedTotals {
    pub fn new(daily_steps: u64, total_steps: u64, day: NaiveDate) -> Self {
        Self {
            daily_steps,
            total_steps,
            day,
        }
    }

    /// Totals as they apply on `today`: a count from an earlier day no
    /// longer belongs to the daily total.
    pub fn rolled_over(self, today: NaiveDate) -> Self {
        if self.day == today {
            return self;
        }

        tracing::info!(
            saved_day = %self.day,
            today = %today,
            dropped_daily = self.daily_steps,
            "Daily step count is from an earlier day, resetting"
        );
        Self {
            daily_steps: 0,
            total_steps: self.total_steps,
            day: today,
        }
    }
}
