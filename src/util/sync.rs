// src/util/sync.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Hands out one mutex per key so callers can serialize work on that key.
///
/// Used to serialize tag-generation runs per bookmark id: two concurrent
/// triggers for the same bookmark take turns instead of racing on the
/// read-merge-write of the tag map.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mutex for `key`, creating it on first use. Lock the
    /// returned mutex for the duration of the keyed work.
    pub fn acquire(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("keyed lock table poisoned");
        locks.entry(key.to_string()).or_default().clone()
    }
}
