// src/infrastructure/repositories/in_memory_store.rs
use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::domain::error::DomainResult;
use crate::domain::repositories::storage::StorageArea;

/// Storage area held entirely in memory. Used in tests and by callers that
/// want an ephemeral, no-disk setup.
#[derive(Debug, Default)]
pub struct InMemoryStorageArea {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryStorageArea {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for InMemoryStorageArea {
    fn get(&self, key: &str) -> DomainResult<Option<Value>> {
        let entries = self.entries.lock().expect("storage map poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> DomainResult<()> {
        let mut entries = self.entries.lock().expect("storage map poisoned");
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> DomainResult<()> {
        let mut entries = self.entries.lock().expect("storage map poisoned");
        entries.remove(key);
        Ok(())
    }
}
