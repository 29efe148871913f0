// src/infrastructure/repositories/tag_repository.rs
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::repositories::repository::TagRepository;
use crate::domain::repositories::storage::{keys, StorageArea};
use crate::domain::tag::Tag;

/// Tag map persisted as one document under [`keys::BOOKMARK_TAGS`].
///
/// All mutations run under a repository-level lock, so the document-wide
/// read-modify-write of `merge_tags` is atomic and concurrent runs cannot
/// overwrite each other's tags.
#[derive(Debug)]
pub struct KvTagRepository {
    storage: Arc<dyn StorageArea>,
    write_lock: Mutex<()>,
}

impl KvTagRepository {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self {
            storage,
            write_lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> DomainResult<HashMap<String, Vec<String>>> {
        match self.storage.get(keys::BOOKMARK_TAGS)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| DomainError::Serialization(e.to_string())),
            None => Ok(HashMap::new()),
        }
    }

    fn write_map(&self, map: &HashMap<String, Vec<String>>) -> DomainResult<()> {
        let value =
            serde_json::to_value(map).map_err(|e| DomainError::Serialization(e.to_string()))?;
        self.storage.set(keys::BOOKMARK_TAGS, value)
    }

    fn to_tags(bookmark_id: &str, values: &[String]) -> Vec<Tag> {
        values
            .iter()
            .filter_map(|value| match Tag::new(value) {
                Ok(tag) => Some(tag),
                Err(e) => {
                    debug!(bookmark_id, value, "dropping invalid stored tag: {}", e);
                    None
                }
            })
            .collect()
    }

    fn to_values(tags: &[Tag]) -> Vec<String> {
        Tag::dedup(tags.to_vec())
            .into_iter()
            .map(|tag| tag.value().to_string())
            .collect()
    }
}

impl TagRepository for KvTagRepository {
    #[instrument(skip(self), level = "debug")]
    fn get_tags(&self, bookmark_id: &str) -> Vec<Tag> {
        match self.read_map() {
            Ok(map) => map
                .get(bookmark_id)
                .map(|values| Self::to_tags(bookmark_id, values))
                .unwrap_or_default(),
            Err(e) => {
                warn!(bookmark_id, "tag read failed, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn get_all(&self) -> DomainResult<HashMap<String, Vec<Tag>>> {
        let map = self.read_map()?;
        Ok(map
            .iter()
            .map(|(id, values)| (id.clone(), Self::to_tags(id, values)))
            .collect())
    }

    #[instrument(skip(self, tags), level = "debug", fields(count = tags.len()))]
    fn save_tags(&self, bookmark_id: &str, tags: &[Tag]) -> DomainResult<()> {
        let _guard = self.write_lock.lock().expect("tag map lock poisoned");
        let mut map = self.read_map()?;
        map.insert(bookmark_id.to_string(), Self::to_values(tags));
        self.write_map(&map)
    }

    #[instrument(skip(self, new_tags), level = "debug", fields(count = new_tags.len()))]
    fn merge_tags(&self, bookmark_id: &str, new_tags: &[Tag]) -> DomainResult<Vec<Tag>> {
        let _guard = self.write_lock.lock().expect("tag map lock poisoned");
        let mut map = self.read_map()?;

        let existing = map
            .get(bookmark_id)
            .map(|values| Self::to_tags(bookmark_id, values))
            .unwrap_or_default();
        let merged = Tag::union(&existing, new_tags);

        map.insert(bookmark_id.to_string(), Self::to_values(&merged));
        self.write_map(&map)?;
        Ok(merged)
    }

    fn remove_tags(&self, bookmark_id: &str) -> DomainResult<()> {
        let _guard = self.write_lock.lock().expect("tag map lock poisoned");
        let mut map = self.read_map()?;
        if map.remove(bookmark_id).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn bookmarks_with_tag(&self, tag: &Tag) -> DomainResult<Vec<String>> {
        let map = self.read_map()?;
        let mut ids: Vec<String> = map
            .iter()
            .filter(|(_, values)| values.iter().any(|v| v == tag.value()))
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        Ok(ids)
    }
}
