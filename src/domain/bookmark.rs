// src/domain/bookmark.rs
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A bookmark as observed from the browser's native store.
///
/// The browser owns the record; this system only reacts to lifecycle events
/// and keeps an auxiliary tag map keyed by `id`.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(setter(into))]
pub struct Bookmark {
    /// Opaque stable identifier, unique within the bookmark tree.
    pub id: String,
    pub title: String,
    pub url: String,
    #[builder(default)]
    #[serde(default)]
    pub parent_id: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
}

impl Bookmark {
    /// Only plain http/https bookmarks can be tagged; folders and
    /// browser-internal URLs are skipped.
    pub fn is_taggable(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }
}

/// Lifecycle events emitted by the browser's bookmark store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BookmarkEvent {
    #[serde(rename = "BOOKMARK_CREATED")]
    Created { id: String, bookmark: Bookmark },
    #[serde(rename = "BOOKMARK_REMOVED")]
    Removed { id: String },
    #[serde(rename = "BOOKMARK_CHANGED")]
    Changed {
        id: String,
        title: Option<String>,
        url: Option<String>,
    },
    #[serde(rename = "BOOKMARK_MOVED")]
    Moved {
        id: String,
        parent_id: Option<String>,
    },
}

impl BookmarkEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            BookmarkEvent::Created { .. } => "BOOKMARK_CREATED",
            BookmarkEvent::Removed { .. } => "BOOKMARK_REMOVED",
            BookmarkEvent::Changed { .. } => "BOOKMARK_CHANGED",
            BookmarkEvent::Moved { .. } => "BOOKMARK_MOVED",
        }
    }

    pub fn bookmark_id(&self) -> &str {
        match self {
            BookmarkEvent::Created { id, .. }
            | BookmarkEvent::Removed { id }
            | BookmarkEvent::Changed { id, .. }
            | BookmarkEvent::Moved { id, .. } => id,
        }
    }
}

/// Change-notification envelope broadcast to any open UI surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEnvelope {
    #[serde(flatten)]
    pub event: BookmarkEvent,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of the most recently created bookmark, kept for popup display.
/// `has_new_bookmark` is set on creation and cleared once the snapshot has
/// been viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastBookmarked {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub date_added: Option<DateTime<Utc>>,
    pub has_new_bookmark: bool,
}

impl LastBookmarked {
    pub fn from_bookmark(bookmark: &Bookmark) -> Self {
        Self {
            id: bookmark.id.clone(),
            title: bookmark.title.clone(),
            url: bookmark.url.clone(),
            date_added: bookmark.date_added,
            has_new_bookmark: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bookmark(url: &str) -> Bookmark {
        BookmarkBuilder::default()
            .id("1")
            .title("Example")
            .url(url)
            .build()
            .unwrap()
    }

    #[test]
    fn given_http_url_when_is_taggable_then_true() {
        assert!(bookmark("https://example.com").is_taggable());
        assert!(bookmark("http://example.com").is_taggable());
    }

    #[test]
    fn given_internal_url_when_is_taggable_then_false() {
        assert!(!bookmark("chrome://settings").is_taggable());
        assert!(!bookmark("file:///tmp/x.html").is_taggable());
        assert!(!bookmark("").is_taggable());
    }

    #[test]
    fn given_event_when_serialized_then_uses_wire_names() {
        let event = BookmarkEvent::Removed {
            id: "42".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "BOOKMARK_REMOVED");
        assert_eq!(value["data"]["id"], "42");
    }

    #[test]
    fn given_created_bookmark_when_snapshot_then_new_flag_is_set() {
        let snapshot = LastBookmarked::from_bookmark(&bookmark("https://example.com"));
        assert!(snapshot.has_new_bookmark);
        assert_eq!(snapshot.id, "1");
    }
}
