//! Mock pedometer for testing

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use walkrace_api::{PedometerPermission, StepCount};

use crate::{GatewayError, GatewayResult, PedometerGateway, StepStream, StepUpdate};

/// Scriptable pedometer for unit/integration testing.
///
/// Step counts are pushed by the test through [`MockPedometer::emit`].
pub struct MockPedometer {
    available: AtomicBool,
    permission: Mutex<PedometerPermission>,
    /// Permission returned by `request_permissions`
    request_result: Mutex<PedometerPermission>,
    history_steps: AtomicU64,
    sender: Mutex<Option<mpsc::UnboundedSender<StepUpdate>>>,

    permission_requests: AtomicU64,
    start_count: AtomicU64,
    stop_count: AtomicU64,

    fail_availability: AtomicBool,
    fail_get_permissions: AtomicBool,
    fail_request_permissions: AtomicBool,
    fail_start_tracking: AtomicBool,
    fail_step_count: AtomicBool,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockPedometer {
    /// An available device with permission already granted
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            permission: Mutex::new(PedometerPermission::granted()),
            request_result: Mutex::new(PedometerPermission::granted()),
            history_steps: AtomicU64::new(0),
            sender: Mutex::new(None),
            permission_requests: AtomicU64::new(0),
            start_count: AtomicU64::new(0),
            stop_count: AtomicU64::new(0),
            fail_availability: AtomicBool::new(false),
            fail_get_permissions: AtomicBool::new(false),
            fail_request_permissions: AtomicBool::new(false),
            fail_start_tracking: AtomicBool::new(false),
            fail_step_count: AtomicBool::new(false),
        }
    }

    /// A device without step counting support
    pub fn unavailable() -> Self {
        let mock = Self::new();
        mock.set_available(false);
        mock
    }

    /// A device whose permission starts as `current` and becomes
    /// `after_request` once requested
    pub fn with_permissions(current: PedometerPermission, after_request: PedometerPermission) -> Self {
        let mock = Self::new();
        *locked(&mock.permission) = current;
        *locked(&mock.request_result) = after_request;
        mock
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn set_history_steps(&self, steps: u64) {
        self.history_steps.store(steps, Ordering::SeqCst);
    }

    pub fn set_fail_availability(&self, fail: bool) {
        self.fail_availability.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_get_permissions(&self, fail: bool) {
        self.fail_get_permissions.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_request_permissions(&self, fail: bool) {
        self.fail_request_permissions.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_start_tracking(&self, fail: bool) {
        self.fail_start_tracking.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_step_count(&self, fail: bool) {
        self.fail_step_count.store(fail, Ordering::SeqCst);
    }

    /// Deliver a cumulative count to the live subscription.
    ///
    /// Returns false when nobody is listening.
    pub fn emit(&self, steps: u64) -> bool {
        match locked(&self.sender).as_ref() {
            Some(tx) => tx.send(StepUpdate { steps }).is_ok(),
            None => false,
        }
    }

    /// How many times a permission prompt was shown
    pub fn permission_requests(&self) -> u64 {
        self.permission_requests.load(Ordering::SeqCst)
    }

    /// How many subscriptions were started
    pub fn start_count(&self) -> u64 {
        self.start_count.load(Ordering::SeqCst)
    }

    /// How many times a live subscription was stopped
    pub fn stop_count(&self) -> u64 {
        self.stop_count.load(Ordering::SeqCst)
    }
}

impl Default for MockPedometer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PedometerGateway for MockPedometer {
    async fn is_available(&self) -> GatewayResult<bool> {
        if self.fail_availability.load(Ordering::SeqCst) {
            return Err(GatewayError::Sensor("Mock availability failure".into()));
        }
        Ok(self.available.load(Ordering::SeqCst))
    }

    async fn get_permissions(&self) -> GatewayResult<PedometerPermission> {
        if self.fail_get_permissions.load(Ordering::SeqCst) {
            return Err(GatewayError::Sensor("Mock permission query failure".into()));
        }
        Ok(*locked(&self.permission))
    }

    async fn request_permissions(&self) -> GatewayResult<PedometerPermission> {
        self.permission_requests.fetch_add(1, Ordering::SeqCst);
        if self.fail_request_permissions.load(Ordering::SeqCst) {
            return Err(GatewayError::Sensor("Mock permission request failure".into()));
        }

        let result = *locked(&self.request_result);
        *locked(&self.permission) = result;
        Ok(result)
    }

    async fn step_count_between(
        &self,
        _start: DateTime<Local>,
        _end: DateTime<Local>,
    ) -> GatewayResult<StepCount> {
        if self.fail_step_count.load(Ordering::SeqCst) {
            return Err(GatewayError::Sensor("Mock step count failure".into()));
        }
        Ok(StepCount {
            steps: self.history_steps.load(Ordering::SeqCst),
        })
    }

    fn start_tracking(&self) -> GatewayResult<StepStream> {
        if self.fail_start_tracking.load(Ordering::SeqCst) {
            return Err(GatewayError::Sensor("Mock subscribe failure".into()));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        // Replacing the sender closes any previous stream
        *locked(&self.sender) = Some(tx);
        self.start_count.fetch_add(1, Ordering::SeqCst);
        Ok(rx)
    }

    fn stop_tracking(&self) {
        if locked(&self.sender).take().is_some() {
            self.stop_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn is_tracking(&self) -> bool {
        locked(&self.sender).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_emits_to_live_subscription() {
        let mock = MockPedometer::new();
        assert!(!mock.emit(5));

        let mut stream = mock.start_tracking().unwrap();
        assert!(mock.emit(5));
        assert!(mock.emit(12));
        assert_eq!(stream.recv().await, Some(StepUpdate { steps: 5 }));
        assert_eq!(stream.recv().await, Some(StepUpdate { steps: 12 }));

        mock.stop_tracking();
        assert_eq!(stream.recv().await, None);
    }

    #[tokio::test]
    async fn restart_replaces_subscription() {
        let mock = MockPedometer::new();
        let mut first = mock.start_tracking().unwrap();
        let mut second = mock.start_tracking().unwrap();

        mock.emit(7);
        assert_eq!(first.recv().await, None);
        assert_eq!(second.recv().await, Some(StepUpdate { steps: 7 }));
        assert_eq!(mock.start_count(), 2);
    }

    #[tokio::test]
    async fn permission_request_updates_state() {
        let mock = MockPedometer::with_permissions(
            PedometerPermission::undetermined(),
            PedometerPermission::denied(false),
        );

        assert!(!mock.get_permissions().await.unwrap().is_granted());
        let result = mock.request_permissions().await.unwrap();
        assert!(result.is_permanently_denied());
        assert_eq!(mock.get_permissions().await.unwrap(), result);
        assert_eq!(mock.permission_requests(), 1);
    }

    #[tokio::test]
    async fn failure_toggles() {
        let mock = MockPedometer::new();
        mock.set_fail_availability(true);
        mock.set_fail_step_count(true);

        assert!(mock.is_available().await.is_err());
        let now = walkrace_util::now();
        assert!(mock.step_count_between(now, now).await.is_err());
    }
}
