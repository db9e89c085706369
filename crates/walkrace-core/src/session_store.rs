//! Session and step store
//!
//! The single authority over the walking session lifecycle and the step
//! totals. Only its own methods mutate its fields; everything else reads
//! derived values.

use chrono::{DateTime, Local, NaiveDate};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkrace_api::{SessionView, StepAccounting};
use walkrace_pedometer::{PedometerGateway, StepStream, TrackingSubscription};
use walkrace_store::{PersistedTotals, Store, StoreExt};
use walkrace_util::{MonotonicInstant, SessionId, WalkraceError, day_of};

use crate::{StopResult, WalkingSession};

/// Start decision from the session store
#[derive(Debug)]
pub enum StartDecision {
    /// A new session is active. `steps` is absent when the pedometer
    /// subscription could not be opened.
    Started {
        session_id: SessionId,
        steps: Option<StepStream>,
    },
    AlreadyActive,
}

impl StartDecision {
    /// Treat a start while active as an error
    pub fn into_result(self) -> walkrace_util::Result<(SessionId, Option<StepStream>)> {
        match self {
            StartDecision::Started { session_id, steps } => Ok((session_id, steps)),
            StartDecision::AlreadyActive => Err(WalkraceError::SessionAlreadyActive),
        }
    }
}

/// Stop decision from the session store
#[derive(Debug)]
pub enum StopDecision {
    Stopped(StopResult),
    NoActiveSession,
}

impl StopDecision {
    /// Treat a stop while inactive as an error
    pub fn into_result(self) -> walkrace_util::Result<StopResult> {
        match self {
            StopDecision::Stopped(result) => Ok(result),
            StopDecision::NoActiveSession => Err(WalkraceError::NoActiveSession),
        }
    }
}

/// Session lifecycle and step aggregation
pub struct SessionStore {
    gateway: Arc<dyn PedometerGateway>,
    store: Arc<dyn Store>,
    accounting: StepAccounting,

    current_session: Option<WalkingSession>,
    subscription: Option<TrackingSubscription>,

    daily_steps: u64,
    total_steps: u64,
    /// Calendar day `daily_steps` belongs to
    day: NaiveDate,
    is_tracking: bool,
    last_update: Option<DateTime<Local>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new(
        gateway: Arc<dyn PedometerGateway>,
        store: Arc<dyn Store>,
        accounting: StepAccounting,
        today: NaiveDate,
    ) -> Self {
        Self {
            gateway,
            store,
            accounting,
            current_session: None,
            subscription: None,
            daily_steps: 0,
            total_steps: 0,
            day: today,
            is_tracking: false,
            last_update: None,
        }
    }

    /// Create a store seeded with whatever totals were persisted.
    ///
    /// A missing or unreadable blob starts from zero.
    pub fn open(
        gateway: Arc<dyn PedometerGateway>,
        store: Arc<dyn Store>,
        accounting: StepAccounting,
        now: DateTime<Local>,
    ) -> Self {
        let today = day_of(&now);
        let persisted = match store.load_totals() {
            Ok(totals) => totals,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted totals, starting from zero");
                None
            }
        };

        let mut session_store = Self::new(gateway, store, accounting, today);
        if let Some(totals) = persisted {
            session_store.restore_totals(totals, today);
        }

        info!(
            daily_steps = session_store.daily_steps,
            total_steps = session_store.total_steps,
            accounting = ?accounting,
            "Session store initialized"
        );
        session_store
    }

    /// Begin a session if none is active
    pub fn start_session(
        &mut self,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> StartDecision {
        if self.is_active() {
            debug!("Start requested while a session is active");
            return StartDecision::AlreadyActive;
        }

        let session = WalkingSession::new(now, now_mono, self.total_steps);
        let session_id = session.id.clone();

        // Tracking failures do not block the session
        let steps = match TrackingSubscription::start(self.gateway.clone()) {
            Ok((subscription, stream)) => {
                self.subscription = Some(subscription);
                Some(stream)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Failed to start step tracking");
                None
            }
        };

        info!(
            session_id = %session_id,
            starting_step_count = session.starting_step_count,
            tracking = steps.is_some(),
            "Session started"
        );

        self.current_session = Some(session);
        self.is_tracking = true;
        self.last_update = Some(now);

        StartDecision::Started { session_id, steps }
    }

    /// Apply a cumulative step count from the pedometer.
    ///
    /// Returns false, changing nothing, when no session is active.
    pub fn update_steps(&mut self, steps: u64, now: DateTime<Local>) -> bool {
        let Some(session) = self.current_session.as_mut().filter(|s| s.is_active) else {
            debug!(steps, "Ignoring step update without an active session");
            return false;
        };

        let added = self.accounting.increment(session.total_steps, steps);
        session.total_steps = steps;
        self.daily_steps = self.daily_steps.saturating_add(added);
        self.total_steps = self.total_steps.saturating_add(added);
        self.last_update = Some(now);

        debug!(
            session_id = %session.id,
            session_steps = steps,
            added,
            daily_steps = self.daily_steps,
            "Steps updated"
        );

        self.persist();
        true
    }

    /// End the active session and clear the totals
    pub fn stop_session(
        &mut self,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> StopDecision {
        let Some(session) = self.current_session.as_mut().filter(|s| s.is_active) else {
            debug!("Stop requested without an active session");
            return StopDecision::NoActiveSession;
        };

        // Release the pedometer before touching state so no update can land
        // on a half-cleared store
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }

        let duration = session.duration_so_far(now_mono);
        session.finish(now);
        let result = StopResult {
            session_id: session.id.clone(),
            session_steps: session.total_steps,
            duration,
        };

        self.is_tracking = false;
        self.daily_steps = 0;
        self.total_steps = 0;
        self.persist();

        info!(
            session_id = %result.session_id,
            session_steps = result.session_steps,
            duration_secs = result.duration.as_secs(),
            "Session stopped"
        );

        StopDecision::Stopped(result)
    }

    /// Clear the daily count regardless of session state
    pub fn reset_daily(&mut self) {
        self.daily_steps = 0;
        self.persist();
        info!("Daily steps reset");
    }

    /// Move to a new calendar day, clearing the daily count when the day
    /// changed. Returns whether a reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.day == today {
            return false;
        }
        info!(from = %self.day, to = %today, "Day changed");
        self.day = today;
        self.reset_daily();
        true
    }

    // Derived reads

    fn active_session(&self) -> Option<&WalkingSession> {
        self.current_session.as_ref().filter(|s| s.is_active)
    }

    pub fn is_active(&self) -> bool {
        self.active_session().is_some()
    }

    /// Steps of the active session, 0 when idle
    pub fn session_steps(&self) -> u64 {
        self.active_session().map_or(0, |s| s.total_steps)
    }

    /// Whole seconds since the active session started, 0 when idle
    pub fn session_duration(&self, now_mono: MonotonicInstant) -> u64 {
        self.active_session()
            .map_or(0, |s| s.duration_so_far(now_mono).as_secs())
    }

    pub fn daily_steps(&self) -> u64 {
        self.daily_steps
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn is_tracking(&self) -> bool {
        self.is_tracking
    }

    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    pub fn day(&self) -> NaiveDate {
        self.day
    }

    pub fn accounting(&self) -> StepAccounting {
        self.accounting
    }

    /// The active session, or the last finished one until the next start
    pub fn current_session(&self) -> Option<&WalkingSession> {
        self.current_session.as_ref()
    }

    /// Presentation-facing snapshot
    pub fn snapshot(&self, now_mono: MonotonicInstant) -> SessionView {
        SessionView {
            session_id: self.active_session().map(|s| s.id.clone()),
            session_steps: self.session_steps(),
            session_duration_secs: self.session_duration(now_mono),
            daily_steps: self.daily_steps,
            total_steps: self.total_steps,
            is_tracking: self.is_tracking,
            last_update: self.last_update,
        }
    }

    // Persistence

    /// The subset of state that survives restarts
    pub fn persisted_totals(&self) -> PersistedTotals {
        PersistedTotals::new(self.daily_steps, self.total_steps, self.day)
    }

    /// Load saved totals, dropping a daily count from an earlier day
    pub fn restore_totals(&mut self, totals: PersistedTotals, today: NaiveDate) {
        let totals = totals.rolled_over(today);
        self.daily_steps = totals.daily_steps;
        self.total_steps = totals.total_steps;
        self.day = totals.day;
    }

    fn persist(&self) {
        if let Err(e) = self.store.save_totals(&self.persisted_totals()) {
            warn!(error = %e, "Failed to persist step totals");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkrace_pedometer::MockPedometer;
    use walkrace_store::SqliteStore;
    use std::time::Duration;

    fn make_store(accounting: StepAccounting) -> (SessionStore, Arc<MockPedometer>, Arc<SqliteStore>) {
        let gateway = Arc::new(MockPedometer::new());
        let store = Arc::new(SqliteStore::in_memory().unwrap());
        let session_store = SessionStore::new(
            gateway.clone(),
            store.clone(),
            accounting,
            day_of(&walkrace_util::now()),
        );
        (session_store, gateway, store)
    }

    fn started(store: &mut SessionStore) -> SessionId {
        match store.start_session(walkrace_util::now(), MonotonicInstant::now()) {
            StartDecision::Started { session_id, .. } => session_id,
            StartDecision::AlreadyActive => panic!("expected a new session"),
        }
    }

    #[derive(Debug, PartialEq)]
    struct Fields {
        session_id: Option<SessionId>,
        session_total: Option<u64>,
        session_active: Option<bool>,
        end_time: Option<DateTime<Local>>,
        daily: u64,
        total: u64,
        tracking: bool,
        last_update: Option<DateTime<Local>>,
    }

    fn fields(store: &SessionStore) -> Fields {
        let session = store.current_session();
        Fields {
            session_id: session.map(|s| s.id.clone()),
            session_total: session.map(|s| s.total_steps),
            session_active: session.map(|s| s.is_active),
            end_time: session.and_then(|s| s.end_time),
            daily: store.daily_steps(),
            total: store.total_steps(),
            tracking: store.is_tracking(),
            last_update: store.last_update(),
        }
    }

    #[test]
    fn test_start_subscribes() {
        let (mut store, gateway, _) = make_store(StepAccounting::default());
        let now = walkrace_util::now();

        let decision = store.start_session(now, MonotonicInstant::now());
        assert!(matches!(decision, StartDecision::Started { steps: Some(_), .. }));
        assert!(store.is_tracking());
        assert!(gateway.is_tracking());
        assert_eq!(store.last_update(), Some(now));
        assert_eq!(store.current_session().unwrap().starting_step_count, 0);
    }

    #[test]
    fn test_start_while_active_changes_nothing() {
        let (mut store, gateway, _) = make_store(StepAccounting::default());
        started(&mut store);
        store.update_steps(42, walkrace_util::now());
        let before = fields(&store);

        let later = walkrace_util::now() + chrono::Duration::seconds(5);
        let decision = store.start_session(later, MonotonicInstant::now());

        assert!(matches!(decision, StartDecision::AlreadyActive));
        assert_eq!(fields(&store), before);
        assert_eq!(gateway.start_count(), 1);
        assert!(matches!(
            decision.into_result(),
            Err(WalkraceError::SessionAlreadyActive)
        ));
    }

    #[test]
    fn test_stop_while_inactive_changes_nothing() {
        let (mut store, _, _) = make_store(StepAccounting::default());
        store.restore_totals(
            PersistedTotals::new(300, 900, store.day()),
            store.day(),
        );
        let before = fields(&store);

        let decision = store.stop_session(walkrace_util::now(), MonotonicInstant::now());
        assert!(matches!(decision, StopDecision::NoActiveSession));
        assert_eq!(fields(&store), before);
        assert!(decision.into_result().unwrap_err().is_invalid_transition());
    }

    #[test]
    fn test_stop_clears_totals_and_ends_session() {
        let (mut store, gateway, _) = make_store(StepAccounting::default());
        let t0 = MonotonicInstant::now();
        let (id, _) = store
            .start_session(walkrace_util::now(), t0)
            .into_result()
            .unwrap();
        store.update_steps(250, walkrace_util::now());
        assert_eq!(store.session_duration(t0 + Duration::from_secs(90)), 90);

        let result = store
            .stop_session(walkrace_util::now(), t0 + Duration::from_secs(90))
            .into_result()
            .unwrap();
        assert_eq!(result.session_id, id);
        assert_eq!(result.session_steps, 250);
        assert_eq!(result.duration, Duration::from_secs(90));

        assert_eq!(store.daily_steps(), 0);
        assert_eq!(store.total_steps(), 0);
        assert!(!store.is_tracking());
        let session = store.current_session().unwrap();
        assert!(!session.is_active);
        assert!(session.end_time.is_some());

        assert!(!gateway.is_tracking());
        assert_eq!(gateway.stop_count(), 1);
    }

    #[test]
    fn test_cumulative_values_are_last_write_wins() {
        let (mut store, _, _) = make_store(StepAccounting::CallbackAsDelta);
        started(&mut store);

        for steps in [120, 340, 900] {
            assert!(store.update_steps(steps, walkrace_util::now()));
        }

        assert_eq!(store.current_session().unwrap().total_steps, 900);
        assert_eq!(store.session_steps(), 900);
        assert_eq!(store.daily_steps(), 1360);
        assert_eq!(store.total_steps(), 1360);
    }

    #[test]
    fn test_session_cumulative_accounting() {
        let (mut store, _, _) = make_store(StepAccounting::SessionCumulative);
        started(&mut store);

        for steps in [120, 340, 900] {
            store.update_steps(steps, walkrace_util::now());
        }

        assert_eq!(store.session_steps(), 900);
        assert_eq!(store.daily_steps(), 900);
        assert_eq!(store.total_steps(), 900);
    }

    #[test]
    fn test_updates_without_session_are_ignored() {
        let (mut store, _, _) = make_store(StepAccounting::default());
        assert!(!store.update_steps(50, walkrace_util::now()));
        assert_eq!(store.daily_steps(), 0);
        assert!(store.last_update().is_none());

        started(&mut store);
        store.stop_session(walkrace_util::now(), MonotonicInstant::now());
        assert!(!store.update_steps(50, walkrace_util::now()));
        assert_eq!(store.daily_steps(), 0);
        assert_eq!(store.session_steps(), 0);
    }

    #[test]
    fn test_session_duration() {
        let (mut store, _, _) = make_store(StepAccounting::default());
        let t0 = MonotonicInstant::now();
        store.start_session(walkrace_util::now(), t0);

        assert_eq!(store.session_duration(t0), 0);
        let d1 = store.session_duration(t0 + Duration::from_secs(4));
        let d2 = store.session_duration(t0 + Duration::from_secs(5));
        assert_eq!(d2 - d1, 1);

        store.stop_session(walkrace_util::now(), MonotonicInstant::now());
        assert_eq!(store.session_duration(t0 + Duration::from_secs(9)), 0);
    }

    #[test]
    fn test_reset_daily_keeps_total() {
        let (mut store, _, _) = make_store(StepAccounting::default());
        started(&mut store);
        store.update_steps(80, walkrace_util::now());

        store.reset_daily();
        assert_eq!(store.daily_steps(), 0);
        assert_eq!(store.total_steps(), 80);
        assert!(store.is_active());
    }

    #[test]
    fn test_roll_over_only_on_new_day() {
        let (mut store, _, _) = make_store(StepAccounting::default());
        started(&mut store);
        store.update_steps(80, walkrace_util::now());

        let today = store.day();
        assert!(!store.roll_over(today));
        assert_eq!(store.daily_steps(), 80);

        assert!(store.roll_over(today.succ_opt().unwrap()));
        assert_eq!(store.daily_steps(), 0);
        assert_eq!(store.total_steps(), 80);
    }

    #[test]
    fn test_subscribe_failure_still_starts() {
        let (mut store, gateway, _) = make_store(StepAccounting::default());
        gateway.set_fail_start_tracking(true);

        let decision = store.start_session(walkrace_util::now(), MonotonicInstant::now());
        assert!(matches!(decision, StartDecision::Started { steps: None, .. }));
        assert!(store.is_tracking());

        // Nothing to release on stop
        store.stop_session(walkrace_util::now(), MonotonicInstant::now());
        assert_eq!(gateway.stop_count(), 0);
    }

    #[test]
    fn test_totals_persist_and_reload() {
        let (mut store, gateway, backing) = make_store(StepAccounting::default());
        started(&mut store);
        store.update_steps(70, walkrace_util::now());
        store.update_steps(110, walkrace_util::now());

        let reopened = SessionStore::open(
            gateway,
            backing.clone(),
            StepAccounting::default(),
            walkrace_util::now(),
        );
        assert_eq!(reopened.daily_steps(), 180);
        assert_eq!(reopened.total_steps(), 180);
        assert!(!reopened.is_active());

        store.stop_session(walkrace_util::now(), MonotonicInstant::now());
        assert_eq!(backing.load_totals().unwrap().unwrap().daily_steps, 0);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let (mut store, gateway, _) = make_store(StepAccounting::default());
        started(&mut store);
        assert!(gateway.is_tracking());

        drop(store);
        assert!(!gateway.is_tracking());
    }

    #[test]
    fn test_snapshot() {
        let (mut store, _, _) = make_store(StepAccounting::default());
        let t0 = MonotonicInstant::now();
        store.start_session(walkrace_util::now(), t0);
        store.update_steps(64, walkrace_util::now());

        let view = store.snapshot(t0 + Duration::from_secs(65));
        assert!(view.session_id.is_some());
        assert_eq!(view.session_steps, 64);
        assert_eq!(view.session_duration_secs, 65);
        assert_eq!(view.daily_steps, 64);
        assert!(view.is_tracking);
    }
}
