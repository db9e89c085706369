//! Error types for walkrace

use thiserror::Error;

/// Core error type for walkrace operations
#[derive(Debug, Error)]
pub enum WalkraceError {
    #[error("No active session")]
    NoActiveSession,

    #[error("Session already active")]
    SessionAlreadyActive,

    #[error("Pedometer unavailable")]
    PedometerUnavailable,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Gateway error: {0}")]
    GatewayError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WalkraceError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn gateway(msg: impl Into<String>) -> Self {
        Self::GatewayError(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// True for the lifecycle misuse cases (double start, double stop)
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::NoActiveSession | Self::SessionAlreadyActive)
    }
}

pub type Result<T> = std::result::Result<T, WalkraceError>;
