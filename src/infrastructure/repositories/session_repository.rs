// src/infrastructure/repositories/session_repository.rs
use std::sync::Arc;

use tracing::instrument;

use crate::domain::bookmark::{ChangeEnvelope, LastBookmarked};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::repositories::repository::SessionRepository;
use crate::domain::repositories::storage::{keys, StorageArea};

/// Session state persisted in the storage area: the last-bookmarked
/// snapshot and the change envelope UI surfaces poll for.
#[derive(Debug)]
pub struct KvSessionRepository {
    storage: Arc<dyn StorageArea>,
}

impl KvSessionRepository {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self { storage }
    }
}

impl SessionRepository for KvSessionRepository {
    #[instrument(skip(self, snapshot), level = "debug", fields(id = %snapshot.id))]
    fn record_last_bookmarked(&self, snapshot: &LastBookmarked) -> DomainResult<()> {
        let value = serde_json::to_value(snapshot)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;
        self.storage.set(keys::LAST_BOOKMARKED, value)
    }

    fn take_last_bookmarked(&self) -> DomainResult<Option<LastBookmarked>> {
        let Some(value) = self.storage.get(keys::LAST_BOOKMARKED)? else {
            return Ok(None);
        };

        let snapshot: LastBookmarked = serde_json::from_value(value)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;

        if snapshot.has_new_bookmark {
            let mut viewed = snapshot.clone();
            viewed.has_new_bookmark = false;
            let value = serde_json::to_value(&viewed)
                .map_err(|e| DomainError::Serialization(e.to_string()))?;
            self.storage.set(keys::LAST_BOOKMARKED, value)?;
        }

        Ok(Some(snapshot))
    }

    #[instrument(skip(self, envelope), level = "debug", fields(kind = envelope.event.kind()))]
    fn publish_change(&self, envelope: &ChangeEnvelope) -> DomainResult<()> {
        let value = serde_json::to_value(envelope)
            .map_err(|e| DomainError::Serialization(e.to_string()))?;
        self.storage.set(keys::BOOKMARK_CHANGE, value)
    }

    fn last_change(&self) -> DomainResult<Option<ChangeEnvelope>> {
        match self.storage.get(keys::BOOKMARK_CHANGE)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| DomainError::Serialization(e.to_string())),
            None => Ok(None),
        }
    }
}
