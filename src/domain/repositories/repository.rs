// src/domain/repositories/repository.rs
use std::collections::HashMap;
use std::fmt::Debug;

use crate::domain::bookmark::{ChangeEnvelope, LastBookmarked};
use crate::domain::error::DomainResult;
use crate::domain::tag::Tag;

/// Persistence port for the bookmark-id → tag-set map.
///
/// Read and write failures are treated asymmetrically: a failed read
/// degrades to "no tags" (the UI can live without them), while a failed
/// write is surfaced, because silently dropping a write would misrepresent
/// persisted state to the user.
pub trait TagRepository: Send + Sync + Debug {
    /// Tags for one bookmark; empty when absent or unreadable.
    fn get_tags(&self, bookmark_id: &str) -> Vec<Tag>;

    /// The full tag map.
    fn get_all(&self) -> DomainResult<HashMap<String, Vec<Tag>>>;

    /// Replace the bookmark's tag set wholesale. Saving an empty slice
    /// persists an empty set; "no entry" and "empty set" are equivalent on
    /// read.
    fn save_tags(&self, bookmark_id: &str, tags: &[Tag]) -> DomainResult<()>;

    /// Atomically read, union and write back: existing tags first, new tags
    /// appended, duplicates dropped. Returns the merged set. Concurrent
    /// merges for the same bookmark cannot lose each other's tags.
    fn merge_tags(&self, bookmark_id: &str, new_tags: &[Tag]) -> DomainResult<Vec<Tag>>;

    /// Drop the bookmark's entry entirely.
    fn remove_tags(&self, bookmark_id: &str) -> DomainResult<()>;

    /// Ids of all bookmarks carrying the given tag.
    fn bookmarks_with_tag(&self, tag: &Tag) -> DomainResult<Vec<String>>;
}

/// Persistence port for per-session UI state: the last-bookmarked snapshot
/// shown in the popup and the change envelope broadcast to open surfaces.
pub trait SessionRepository: Send + Sync + Debug {
    fn record_last_bookmarked(&self, snapshot: &LastBookmarked) -> DomainResult<()>;

    /// Returns the snapshot and clears its new-bookmark flag, so a second
    /// viewer no longer sees it as fresh.
    fn take_last_bookmarked(&self) -> DomainResult<Option<LastBookmarked>>;

    fn publish_change(&self, envelope: &ChangeEnvelope) -> DomainResult<()>;

    fn last_change(&self) -> DomainResult<Option<ChangeEnvelope>>;
}
