//! Store trait definitions

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{PersistedTotals, StoreResult, TOTALS_KEY};

/// Main store trait
pub trait Store: Send + Sync {
    // Key-value blobs

    /// Get the raw JSON stored under `key`
    fn get_value(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store raw JSON under `key`, replacing any previous value
    fn put_value(&self, key: &str, json: &str) -> StoreResult<()>;

    /// Remove `key` if present
    fn remove_value(&self, key: &str) -> StoreResult<()>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Typed access on top of the JSON blobs
pub trait StoreExt: Store {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.get_value(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.put_value(key, &json)
    }

    /// Load the persisted step totals, if any were saved
    fn load_totals(&self) -> StoreResult<Option<PersistedTotals>> {
        self.get_json(TOTALS_KEY)
    }

    /// Save the step totals
    fn save_totals(&self, totals: &PersistedTotals) -> StoreResult<()> {
        self.put_json(TOTALS_KEY, totals)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
