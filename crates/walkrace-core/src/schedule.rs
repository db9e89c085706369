//! Session-scoped periodic ticks

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// A periodic timer that only runs while a session does.
///
/// Disarmed, [`TickSchedule::next`] never completes, so a `select!` branch
/// over it simply stays quiet.
#[derive(Debug)]
pub struct TickSchedule {
    period: Duration,
    interval: Option<Interval>,
}

impl TickSchedule {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Start ticking; the first tick is one period from now. Re-arming
    /// restarts the phase.
    pub fn arm(&mut self) {
        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    /// Cancel pending ticks
    pub fn disarm(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick
    pub async fn next(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
