//! Shared utilities for walkrace
//!
//! This crate provides:
//! - ID types (SessionId, PlayerId)
//! - Time utilities (monotonic time, mock wall-clock time, duration formatting)
//! - Error types
//! - Per-key cooldown tracking
//! - Default paths for config and data directories

mod cooldown;
mod error;
mod ids;
mod paths;
mod time;

pub use cooldown::*;
pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
