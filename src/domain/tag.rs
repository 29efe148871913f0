// src/domain/tag.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::{DomainError, DomainResult};

/// Maximum tag length in characters (not bytes; tags are frequently CJK).
pub const MAX_TAG_CHARS: usize = 20;

/// Represents a single tag as a value object.
///
/// Tags are short labels attached to bookmarks, either typed by the user or
/// produced by the model. Case is preserved: "AI" and "ai" are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tag {
    value: String,
}

impl Tag {
    /// Creates a new Tag with validation.
    pub fn new<S: AsRef<str>>(value: S) -> DomainResult<Self> {
        let value = value.as_ref().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::InvalidTag("Tag cannot be empty".to_string()));
        }

        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidTag(
                "Tag cannot contain whitespace".to_string(),
            ));
        }

        if value.chars().count() > MAX_TAG_CHARS {
            return Err(DomainError::InvalidTag(format!(
                "Tag cannot be longer than {} characters",
                MAX_TAG_CHARS
            )));
        }

        Ok(Self { value })
    }

    /// Get the tag value
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Deduplicate a list of tags, preserving first-seen order.
    pub fn dedup(tags: Vec<Tag>) -> Vec<Tag> {
        let mut seen = Vec::with_capacity(tags.len());
        for tag in tags {
            if !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        seen
    }

    /// Union of two tag lists: existing tags first, then new tags that are
    /// not already present. Order within each list is preserved.
    pub fn union(existing: &[Tag], new: &[Tag]) -> Vec<Tag> {
        let mut merged = Self::dedup(existing.to_vec());
        for tag in new {
            if !merged.contains(tag) {
                merged.push(tag.clone());
            }
        }
        merged
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl TryFrom<String> for Tag {
    type Error = DomainError;

    fn try_from(value: String) -> DomainResult<Self> {
        Tag::new(value)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_valid_tag_value_when_create_tag_then_returns_tag() {
        let tag = Tag::new("rust").unwrap();
        assert_eq!(tag.value(), "rust");

        // Should trim whitespace
        let tag = Tag::new(" rust ").unwrap();
        assert_eq!(tag.value(), "rust");

        // Case is preserved
        let tag = Tag::new("AI学习").unwrap();
        assert_eq!(tag.value(), "AI学习");
    }

    #[test]
    fn given_invalid_tag_value_when_create_tag_then_returns_error() {
        // Empty tag
        assert!(Tag::new("").is_err());

        // Tag with inner whitespace
        assert!(Tag::new("two words").is_err());
        assert!(Tag::new("tab\there").is_err());

        // Tag over the character limit (21 CJK chars)
        assert!(Tag::new("标".repeat(21)).is_err());

        // Exactly at the limit is fine
        assert!(Tag::new("标".repeat(20)).is_ok());
    }

    #[test]
    fn given_duplicated_tags_when_dedup_then_first_seen_order_is_kept() {
        let tags = vec![
            Tag::new("a").unwrap(),
            Tag::new("b").unwrap(),
            Tag::new("a").unwrap(),
            Tag::new("c").unwrap(),
        ];

        let deduped = Tag::dedup(tags);
        let values: Vec<&str> = deduped.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn given_overlapping_lists_when_union_then_existing_tags_come_first() {
        let existing = vec![Tag::new("工作").unwrap()];
        let new = vec![Tag::new("效率").unwrap(), Tag::new("工作").unwrap()];

        let merged = Tag::union(&existing, &new);
        let values: Vec<&str> = merged.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec!["工作", "效率"]);
    }

    #[test]
    fn given_serialized_tag_when_deserializing_then_validation_applies() {
        let tag: Tag = serde_json::from_str("\"rust\"").unwrap();
        assert_eq!(tag.value(), "rust");

        let invalid: Result<Tag, _> = serde_json::from_str("\"two words\"");
        assert!(invalid.is_err());
    }
}
