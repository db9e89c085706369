//! Permission and availability gate
//!
//! Decides whether a session may start: the device must support step
//! counting and motion permission must be granted. Sensor failures resolve
//! to the safe side (unavailable or denied) instead of erroring.

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{info, warn};
use walkrace_api::{Notice, PedometerPermission};
use walkrace_pedometer::PedometerGateway;
use walkrace_util::MonotonicInstant;

use crate::{SessionStore, StartDecision};

/// What the gate knows about the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unchecked,
    Unavailable,
    Available { permission: PedometerPermission },
}

/// Outcome of a start attempt through the gate
#[derive(Debug)]
pub enum GateOutcome {
    /// The session store was asked to start
    Started(StartDecision),
    /// The start was refused; show the notice
    Refused(Notice),
}

/// Gate in front of [`SessionStore::start_session`]
pub struct PermissionGate {
    gateway: Arc<dyn PedometerGateway>,
    state: GateState,
}

impl PermissionGate {
    pub fn new(gateway: Arc<dyn PedometerGateway>) -> Self {
        Self {
            gateway,
            state: GateState::Unchecked,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    /// Availability as last checked; false until checked
    pub fn is_available(&self) -> bool {
        matches!(self.state, GateState::Available { .. })
    }

    /// Permission as last seen; undetermined until checked
    pub fn permission(&self) -> PedometerPermission {
        match self.state {
            GateState::Available { permission } => permission,
            _ => PedometerPermission::undetermined(),
        }
    }

    /// Query availability and, when available, the current permission
    pub async fn check(&mut self) -> GateState {
        let available = match self.gateway.is_available().await {
            Ok(available) => available,
            Err(e) => {
                warn!(error = %e, "Availability check failed, treating as unavailable");
                false
            }
        };

        self.state = if available {
            GateState::Available {
                permission: self.current_permission().await,
            }
        } else {
            GateState::Unavailable
        };

        info!(state = ?self.state, "Pedometer checked");
        self.state
    }

    /// One start attempt: check, prompt for permission if needed, then start.
    ///
    /// Availability is queried afresh on every attempt so a sensor that
    /// recovers can be used without restarting.
    pub async fn request_start(
        &mut self,
        store: &mut SessionStore,
        now: DateTime<Local>,
        now_mono: MonotonicInstant,
    ) -> GateOutcome {
        self.check().await;

        let permission = match self.state {
            GateState::Available { permission } => permission,
            _ => {
                info!("Start refused: pedometer unavailable");
                return GateOutcome::Refused(Notice::Unavailable);
            }
        };

        if !permission.is_granted() {
            let requested = self.prompt_permission().await;
            self.state = GateState::Available {
                permission: requested,
            };

            if !requested.is_granted() {
                info!(
                    can_ask_again = requested.can_ask_again,
                    "Start refused: permission not granted"
                );
                return GateOutcome::Refused(Notice::PermissionDenied {
                    can_ask_again: requested.can_ask_again,
                });
            }
        }

        GateOutcome::Started(store.start_session(now, now_mono))
    }

    async fn current_permission(&self) -> PedometerPermission {
        match self.gateway.get_permissions().await {
            Ok(permission) => permission,
            Err(e) => {
                warn!(error = %e, "Permission query failed, treating as undetermined");
                PedometerPermission::undetermined()
            }
        }
    }

    async fn prompt_permission(&self) -> PedometerPermission {
        match self.gateway.request_permissions().await {
            Ok(permission) => permission,
            Err(e) => {
                warn!(error = %e, "Permission request failed, treating as denied");
                PedometerPermission::denied(false)
            }
        }
    }
}
