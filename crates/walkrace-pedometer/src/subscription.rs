//! Scoped tracking subscription

use std::sync::Arc;
use tracing::debug;

use crate::{GatewayResult, PedometerGateway, StepStream};

/// Keeps a pedometer subscription alive for as long as it is held.
///
/// Releasing or dropping the guard calls `stop_tracking` on the gateway
/// exactly once.
pub struct TrackingSubscription {
    gateway: Arc<dyn PedometerGateway>,
    released: bool,
}

impl TrackingSubscription {
    /// Subscribe to `gateway`, returning the guard and its update stream
    pub fn start(gateway: Arc<dyn PedometerGateway>) -> GatewayResult<(Self, StepStream)> {
        let stream = gateway.start_tracking()?;
        debug!("Pedometer subscription started");
        Ok((
            Self {
                gateway,
                released: false,
            },
            stream,
        ))
    }

    /// Stop tracking now
    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if !self.released {
            self.released = true;
            self.gateway.stop_tracking();
            debug!("Pedometer subscription released");
        }
    }
}

impl Drop for TrackingSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TrackingSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingSubscription")
            .field("released", &self.released)
            .finish()
    }
}
