//! SQLite-based store implementation

use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::{Store, StoreError, StoreResult};

/// SQLite-based store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value_json TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;

        debug!("Store schema initialized");
        Ok(())
    }
}

impl Store for SqliteStore {
    fn get_value(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn()?;

        let json = conn
            .query_row("SELECT value_json FROM kv WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;

        Ok(json)
    }

    fn put_value(&self, key: &str, json: &str) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO kv (key, value_json, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key)
            DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at
            "#,
            params![key, json, walkrace_util::now().to_rfc3339()],
        )?;

        debug!(key, "Value saved");
        Ok(())
    }

    fn remove_value(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        match self.conn.lock() {
            Ok(conn) => conn.query_row("SELECT 1", [], |_| Ok(())).is_ok(),
            Err(_) => {
                warn!("Store lock poisoned");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PersistedTotals, StoreExt, TOTALS_KEY};
    use chrono::NaiveDate;

    #[test]
    fn test_in_memory_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.is_healthy());
    }

    #[test]
    fn test_values_upsert() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.get_value("k").unwrap().is_none());

        store.put_value("k", "1").unwrap();
        store.put_value("k", "2").unwrap();
        assert_eq!(store.get_value("k").unwrap().as_deref(), Some("2"));

        store.remove_value("k").unwrap();
        assert!(store.get_value("k").unwrap().is_none());
    }

    #[test]
    fn test_totals_under_namespaced_key() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load_totals().unwrap().is_none());

        let day = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let totals = PersistedTotals::new(180, 4_200, day);
        store.save_totals(&totals).unwrap();

        assert_eq!(store.load_totals().unwrap(), Some(totals));
        assert!(store.get_value(TOTALS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let store = SqliteStore::in_memory().unwrap();
        store.put_value(TOTALS_KEY, "not json").unwrap();
        assert!(matches!(
            store.load_totals(),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_totals_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("walkrace.db");
        let day = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .save_totals(&PersistedTotals::new(50, 900, day))
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let loaded = store.load_totals().unwrap().unwrap();
        assert_eq!(loaded.total_steps, 900);

        // Reopened the next morning
        let next_day = day.succ_opt().unwrap();
        let rolled = loaded.rolled_over(next_day);
        assert_eq!(rolled.daily_steps, 0);
        assert_eq!(rolled.total_steps, 900);
    }
}
