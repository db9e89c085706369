//! Pedometer gateway traits

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;
use tokio::sync::mpsc;
use walkrace_api::{PedometerPermission, StepCount};

/// Errors from pedometer gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Pedometer unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Sensor error: {0}")]
    Sensor(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<GatewayError> for walkrace_util::WalkraceError {
    fn from(e: GatewayError) -> Self {
        use walkrace_util::WalkraceError;
        match e {
            GatewayError::Unavailable(_) => WalkraceError::PedometerUnavailable,
            GatewayError::PermissionDenied => WalkraceError::permission("motion & fitness"),
            GatewayError::Internal(msg) => WalkraceError::internal(msg),
            other => WalkraceError::gateway(other.to_string()),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// A cumulative step count reported by the sensor since tracking started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepUpdate {
    pub steps: u64,
}

/// Updates for one tracking subscription, in delivery order
pub type StepStream = mpsc::UnboundedReceiver<StepUpdate>;

/// Pedometer gateway - implemented by device sensors and simulators
#[async_trait]
pub trait PedometerGateway: Send + Sync {
    /// Whether step counting is supported at all
    async fn is_available(&self) -> GatewayResult<bool>;

    /// Current motion permission, without prompting
    async fn get_permissions(&self) -> GatewayResult<PedometerPermission>;

    /// Prompt for motion permission
    async fn request_permissions(&self) -> GatewayResult<PedometerPermission>;

    /// Steps the device recorded between two wall-clock times
    async fn step_count_between(
        &self,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> GatewayResult<StepCount>;

    /// Begin delivering cumulative step counts.
    ///
    /// Starting while already tracking replaces the previous subscription;
    /// the old stream closes.
    fn start_tracking(&self) -> GatewayResult<StepStream>;

    /// Stop delivering updates and close the stream. No-op when idle.
    fn stop_tracking(&self);

    /// Whether a subscription is live
    fn is_tracking(&self) -> bool;
}
