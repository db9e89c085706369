//! Simulated pedometer for hosts without a motion sensor

use async_trait::async_trait;
use chrono::{DateTime, Local};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::ops::Range;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use walkrace_api::{PedometerPermission, PermissionStatus, StepCount};

use crate::{GatewayError, GatewayResult, PedometerGateway, StepStream, StepUpdate};

/// How the simulated device behaves
#[derive(Debug, Clone)]
pub struct SimulatedSettings {
    pub available: bool,
    pub initial_permission: PermissionStatus,
    /// Whether the permission prompt is accepted
    pub grant_on_request: bool,
    pub update_interval: Duration,
    /// Half-open range of steps walked between updates
    pub steps_per_update: Range<u64>,
}

impl Default for SimulatedSettings {
    fn default() -> Self {
        Self {
            available: true,
            initial_permission: PermissionStatus::Undetermined,
            grant_on_request: true,
            update_interval: Duration::from_secs(1),
            steps_per_update: 1..4,
        }
    }
}

type StepLog = Arc<Mutex<Vec<(DateTime<Local>, u64)>>>;

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A walker that never stops: emits a growing cumulative count on a timer.
///
/// Requires a tokio runtime while tracking.
pub struct SimulatedPedometer {
    settings: SimulatedSettings,
    permission: Mutex<PedometerPermission>,
    rng: Mutex<ChaCha8Rng>,
    walker: Mutex<Option<JoinHandle<()>>>,
    log: StepLog,
}

impl SimulatedPedometer {
    pub fn new(settings: SimulatedSettings, seed: Option<u64>) -> Self {
        let permission = match settings.initial_permission {
            PermissionStatus::Granted => PedometerPermission::granted(),
            PermissionStatus::Denied => PedometerPermission::denied(false),
            PermissionStatus::Undetermined => PedometerPermission::undetermined(),
        };
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            settings,
            permission: Mutex::new(permission),
            rng: Mutex::new(rng),
            walker: Mutex::new(None),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn ensure_available(&self) -> GatewayResult<()> {
        if self.settings.available {
            Ok(())
        } else {
            Err(GatewayError::Unavailable("simulated device has no step counter".into()))
        }
    }
}

/// Append an update, dropping entries from earlier days. History only needs
/// to answer queries about today.
fn record_step(log: &mut Vec<(DateTime<Local>, u64)>, at: DateTime<Local>, walked: u64) {
    let today = walkrace_util::day_of(&at);
    log.retain(|(when, _)| walkrace_util::day_of(when) >= today);
    log.push((at, walked));
}

async fn walk(
    tx: mpsc::UnboundedSender<StepUpdate>,
    mut rng: ChaCha8Rng,
    interval: Duration,
    steps_per_update: Range<u64>,
    log: StepLog,
) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately
    ticker.tick().await;

    let mut cumulative = 0u64;
    loop {
        ticker.tick().await;

        let walked = if steps_per_update.is_empty() {
            0
        } else {
            rng.gen_range(steps_per_update.clone())
        };
        cumulative += walked;
        record_step(&mut locked(&log), walkrace_util::now(), walked);

        if tx.send(StepUpdate { steps: cumulative }).is_err() {
            debug!("Step stream receiver dropped, simulated walker exiting");
            break;
        }
    }
}

#[async_trait]
impl PedometerGateway for SimulatedPedometer {
    async fn is_available(&self) -> GatewayResult<bool> {
        Ok(self.settings.available)
    }

    async fn get_permissions(&self) -> GatewayResult<PedometerPermission> {
        self.ensure_available()?;
        Ok(*locked(&self.permission))
    }

    async fn request_permissions(&self) -> GatewayResult<PedometerPermission> {
        self.ensure_available()?;

        let mut permission = locked(&self.permission);
        if !permission.is_granted() && permission.can_ask_again {
            *permission = if self.settings.grant_on_request {
                PedometerPermission::granted()
            } else {
                PedometerPermission::denied(false)
            };
            info!(status = ?permission.status, "Simulated permission prompt answered");
        }
        Ok(*permission)
    }

    async fn step_count_between(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> GatewayResult<StepCount> {
        self.ensure_available()?;
        let steps = locked(&self.log)
            .iter()
            .filter(|(at, _)| *at >= start && *at <= end)
            .map(|(_, walked)| walked)
            .sum();
        Ok(StepCount { steps })
    }

    fn start_tracking(&self) -> GatewayResult<StepStream> {
        self.ensure_available()?;
        if !locked(&self.permission).is_granted() {
            return Err(GatewayError::PermissionDenied);
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| GatewayError::Internal(format!("no async runtime: {}", e)))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let task_rng = ChaCha8Rng::seed_from_u64(locked(&self.rng).r#gen());
        let handle = runtime.spawn(walk(
            tx,
            task_rng,
            self.settings.update_interval,
            self.settings.steps_per_update.clone(),
            self.log.clone(),
        ));

        if let Some(previous) = locked(&self.walker).replace(handle) {
            debug!("Replacing previous simulated subscription");
            previous.abort();
        }
        Ok(rx)
    }

    fn stop_tracking(&self) {
        if let Some(handle) = locked(&self.walker).take() {
            handle.abort();
            debug!("Simulated walker stopped");
        }
    }

    fn is_tracking(&self) -> bool {
        locked(&self.walker)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for SimulatedPedometer {
    fn drop(&mut self) {
        self.stop_tracking();
    }
}
