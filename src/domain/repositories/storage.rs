// src/domain/repositories/storage.rs
use std::fmt::Debug;

use serde_json::Value;

use crate::domain::error::DomainResult;

/// Well-known keys in the storage area.
pub mod keys {
    /// `{ bookmarkId: [tag, ...] }`
    pub const BOOKMARK_TAGS: &str = "bookmarkTags";
    /// The persisted [`ApiConfigRecord`](crate::domain::api_config::ApiConfigRecord).
    pub const API_CONFIG: &str = "aiApiConfig";
    /// Snapshot of the most recently created bookmark.
    pub const LAST_BOOKMARKED: &str = "lastBookmarked";
    /// Change-notification envelope for open UI surfaces.
    pub const BOOKMARK_CHANGE: &str = "bookmarkChange";
}

/// The extension-local key-value storage area.
///
/// Each `set` replaces one key atomically; there are no transactions
/// spanning keys. Higher layers decide whether read failures are swallowed
/// or surfaced — this port reports them faithfully.
pub trait StorageArea: Send + Sync + Debug {
    fn get(&self, key: &str) -> DomainResult<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> DomainResult<()>;

    fn remove(&self, key: &str) -> DomainResult<()>;
}
