// src/infrastructure/repositories/sqlite_store.rs
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::debug;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::repositories::storage::StorageArea;
use crate::infrastructure::error::InfrastructureError;

/// Key-value storage area on a single SQLite table.
///
/// Every `set` is one `INSERT OR REPLACE`, so each key is replaced
/// atomically; a crash mid-pipeline can leave keys from different stages
/// out of step with each other but never a torn value.
#[derive(Debug)]
pub struct SqliteStorageArea {
    conn: Mutex<Connection>,
}

impl SqliteStorageArea {
    pub fn open<P: AsRef<Path>>(path: P) -> DomainResult<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path.as_ref()).map_err(InfrastructureError::from)?;
        Self::initialize(conn)
    }

    /// Private on-disk-free variant, handy for throwaway processes.
    pub fn open_in_memory() -> DomainResult<Self> {
        let conn = Connection::open_in_memory().map_err(InfrastructureError::from)?;
        Self::initialize(conn)
    }

    fn initialize(conn: Connection) -> DomainResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )
        .map_err(InfrastructureError::from)?;

        debug!("storage area ready");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StorageArea for SqliteStorageArea {
    fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        let conn = self.conn.lock().expect("storage connection poisoned");
        let raw: Option<String> = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(InfrastructureError::from)?;

        match raw {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(|e| DomainError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: Value) -> DomainResult<()> {
        let text =
            serde_json::to_string(&value).map_err(|e| DomainError::Serialization(e.to_string()))?;

        let conn = self.conn.lock().expect("storage connection poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, text],
        )
        .map_err(InfrastructureError::from)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        let conn = self.conn.lock().expect("storage connection poisoned");
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])
            .map_err(InfrastructureError::from)?;
        Ok(())
    }
}
