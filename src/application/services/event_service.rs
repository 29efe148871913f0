// src/application/services/event_service.rs
use std::fmt::Debug;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument, warn};

use crate::application::error::ApplicationResult;
use crate::application::services::generation_service::GenerationService;
use crate::domain::bookmark::{BookmarkEvent, ChangeEnvelope, LastBookmarked};
use crate::domain::repositories::repository::SessionRepository;

/// Reactions to bookmark lifecycle events.
///
/// Tagging is best-effort and fully decoupled: a generation failure is
/// logged and swallowed, never surfaced to the event that triggered it.
pub trait EventService: Send + Sync + Debug {
    fn handle_event(&self, event: &BookmarkEvent) -> ApplicationResult<()>;

    /// The last-bookmarked snapshot for popup display; viewing it clears
    /// the new-bookmark flag.
    fn take_last_bookmarked(&self) -> ApplicationResult<Option<LastBookmarked>>;
}

#[derive(Debug)]
pub struct EventServiceImpl {
    session_repository: Arc<dyn SessionRepository>,
    generation_service: Arc<dyn GenerationService>,
}

impl EventServiceImpl {
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        generation_service: Arc<dyn GenerationService>,
    ) -> Self {
        Self {
            session_repository,
            generation_service,
        }
    }
}

impl EventService for EventServiceImpl {
    #[instrument(skip(self, event), level = "debug", fields(kind = event.kind(), id = event.bookmark_id()))]
    fn handle_event(&self, event: &BookmarkEvent) -> ApplicationResult<()> {
        self.session_repository.publish_change(&ChangeEnvelope {
            event: event.clone(),
            timestamp: Utc::now(),
        })?;

        if let BookmarkEvent::Created { bookmark, .. } = event {
            if !bookmark.is_taggable() {
                debug!("bookmark is not taggable, no snapshot or generation");
                return Ok(());
            }

            self.session_repository
                .record_last_bookmarked(&LastBookmarked::from_bookmark(bookmark))?;

            match self.generation_service.generate_for_bookmark(bookmark) {
                Ok(outcome) => debug!(?outcome, "tag generation finished"),
                Err(e) => warn!("tag generation failed: {}", e),
            }
        }

        Ok(())
    }

    fn take_last_bookmarked(&self) -> ApplicationResult<Option<LastBookmarked>> {
        Ok(self.session_repository.take_last_bookmarked()?)
    }
}
