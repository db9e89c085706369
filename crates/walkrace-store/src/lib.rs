//! Persistence layer for walkrace
//!
//! Provides:
//! - A namespaced key-value table of JSON blobs
//! - The persisted daily/lifetime step totals with day rollover

mod sqlite;
mod totals;
mod traits;

pub use sqlite::*;
pub use totals::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for walkrace_util::WalkraceError {
    fn from(e: StoreError) -> Self {
        walkrace_util::WalkraceError::store(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
