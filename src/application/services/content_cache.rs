// src/application/services/content_cache.rs
//! Bounded, TTL-scoped cache of cleaned page content, keyed by URL.
//!
//! Owned by the generation service and passed by reference — there is no
//! module-level singleton. Expiry is visible at lookup (a stale entry reads
//! as absent) and as an explicit, testable sweep (`evict_expired`).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::domain::content::CleanedContent;

pub const DEFAULT_CAPACITY: usize = 128;
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    data: CleanedContent,
    cached_at: Instant,
    last_used: Instant,
}

#[derive(Debug)]
pub struct ContentCache {
    entries: HashMap<String, CacheEntry>,
    capacity: usize,
    ttl: Duration,
}

impl ContentCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// A fresh entry for `url`, or `None`. Entries past the TTL are treated
    /// as absent and dropped on the spot.
    pub fn get(&mut self, url: &str) -> Option<CleanedContent> {
        let now = Instant::now();
        match self.entries.get_mut(url) {
            Some(entry) if now.duration_since(entry.cached_at) < self.ttl => {
                entry.last_used = now;
                Some(entry.data.clone())
            }
            Some(_) => {
                self.entries.remove(url);
                None
            }
            None => None,
        }
    }

    /// Insert or refresh the entry for `url`. At capacity, the least
    /// recently used entry makes room.
    pub fn insert(&mut self, url: &str, data: CleanedContent) {
        let now = Instant::now();

        if !self.entries.contains_key(url) && self.entries.len() >= self.capacity {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            url.to_string(),
            CacheEntry {
                data,
                cached_at: now,
                last_used: now,
            },
        );
    }

    /// Drop every entry past the TTL, returning how many were removed.
    pub fn evict_expired(&mut self) -> usize {
        let now = Instant::now();
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.cached_at) < ttl);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Test hook: age an entry as if it had been cached `age` ago.
    #[cfg(test)]
    fn backdate(&mut self, url: &str, age: Duration) {
        if let Some(entry) = self.entries.get_mut(url) {
            if let Some(past) = Instant::now().checked_sub(age) {
                entry.cached_at = past;
                entry.last_used = past;
            }
        }
    }
}

impl Default for ContentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(marker: &str) -> CleanedContent {
        CleanedContent {
            title: marker.to_string(),
            ..CleanedContent::default()
        }
    }

    #[test]
    fn given_cached_entry_when_fresh_then_it_is_returned() {
        let mut cache = ContentCache::default();
        cache.insert("https://a", content("a"));

        let hit = cache.get("https://a").unwrap();
        assert_eq!(hit.title, "a");
        assert!(cache.get("https://b").is_none());
    }

    #[test]
    fn given_expired_entry_when_read_then_treated_as_absent() {
        let mut cache = ContentCache::default();
        cache.insert("https://a", content("a"));
        cache.backdate("https://a", DEFAULT_TTL + Duration::from_secs(1));

        assert!(cache.get("https://a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn given_full_cache_when_inserting_then_least_recently_used_is_evicted() {
        let mut cache = ContentCache::new(2, DEFAULT_TTL);
        cache.insert("https://a", content("a"));
        cache.insert("https://b", content("b"));

        // Touch "a" so "b" becomes the eviction candidate.
        cache.backdate("https://b", Duration::from_secs(10));
        let _ = cache.get("https://a");

        cache.insert("https://c", content("c"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("https://a").is_some());
        assert!(cache.get("https://b").is_none());
        assert!(cache.get("https://c").is_some());
    }

    #[test]
    fn given_mixed_ages_when_evict_expired_then_only_stale_entries_go() {
        let mut cache = ContentCache::default();
        cache.insert("https://old", content("old"));
        cache.insert("https://new", content("new"));
        cache.backdate("https://old", DEFAULT_TTL + Duration::from_secs(1));

        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("https://new").is_some());
    }

    #[test]
    fn given_reinserted_key_when_at_capacity_then_no_eviction_happens() {
        let mut cache = ContentCache::new(2, DEFAULT_TTL);
        cache.insert("https://a", content("a"));
        cache.insert("https://b", content("b"));
        cache.insert("https://a", content("a2"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("https://a").unwrap().title, "a2");
        assert!(cache.get("https://b").is_some());
    }
}
