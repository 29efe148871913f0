// src/infrastructure/di/service_container.rs
use std::sync::Arc;
use std::time::Duration;

use crate::application::error::ApplicationResult;
use crate::application::services::config_service::ConfigService;
use crate::application::services::event_service::{EventService, EventServiceImpl};
use crate::application::services::generation_service::GenerationService;
use crate::application::{ConfigServiceImpl, GenerationServiceImpl};
use crate::config::Settings;
use crate::domain::gateway::ChatGateway;
use crate::domain::repositories::repository::{SessionRepository, TagRepository};
use crate::domain::repositories::storage::StorageArea;
use crate::domain::services::page_source::PageSource;
use crate::infrastructure::http_page_source::HttpPageSource;
use crate::infrastructure::llm::HttpChatGateway;
use crate::infrastructure::repositories::session_repository::KvSessionRepository;
use crate::infrastructure::repositories::sqlite_store::SqliteStorageArea;
use crate::infrastructure::repositories::tag_repository::KvTagRepository;

/// Production service container - single source of truth for service
/// creation. All state (stores, caches) is owned here and passed by
/// reference; there are no module-level singletons.
pub struct ServiceContainer {
    pub storage: Arc<dyn StorageArea>,
    pub tag_repository: Arc<dyn TagRepository>,
    pub session_repository: Arc<dyn SessionRepository>,
    pub config_service: Arc<dyn ConfigService>,
    pub generation_service: Arc<dyn GenerationService>,
    pub event_service: Arc<dyn EventService>,
}

impl ServiceContainer {
    /// Create all services with explicit dependency injection, backed by
    /// the SQLite storage area from `settings`.
    pub fn new(settings: &Settings) -> ApplicationResult<Self> {
        let storage: Arc<dyn StorageArea> = Arc::new(SqliteStorageArea::open(&settings.db_url)?);
        Self::with_components(
            storage,
            Arc::new(HttpPageSource::new()),
            Arc::new(HttpChatGateway::new()),
            settings,
        )
    }

    /// Wire the service graph over caller-provided ports. Tests hand in an
    /// in-memory store and stubbed page/gateway implementations.
    pub fn with_components(
        storage: Arc<dyn StorageArea>,
        page_source: Arc<dyn PageSource>,
        gateway: Arc<dyn ChatGateway>,
        settings: &Settings,
    ) -> ApplicationResult<Self> {
        let tag_repository: Arc<dyn TagRepository> =
            Arc::new(KvTagRepository::new(storage.clone()));
        let session_repository: Arc<dyn SessionRepository> =
            Arc::new(KvSessionRepository::new(storage.clone()));
        let config_service: Arc<dyn ConfigService> =
            Arc::new(ConfigServiceImpl::new(storage.clone()));

        let generation_service: Arc<dyn GenerationService> =
            Arc::new(GenerationServiceImpl::with_options(
                config_service.clone(),
                tag_repository.clone(),
                page_source,
                gateway,
                settings.content_cache.capacity,
                Duration::from_secs(settings.content_cache.ttl_secs),
                Duration::from_millis(settings.extraction_timeout_ms),
            ));

        let event_service: Arc<dyn EventService> = Arc::new(EventServiceImpl::new(
            session_repository.clone(),
            generation_service.clone(),
        ));

        Ok(Self {
            storage,
            tag_repository,
            session_repository,
            config_service,
            generation_service,
            event_service,
        })
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("storage", &"Arc<dyn StorageArea>")
            .field("tag_repository", &"Arc<dyn TagRepository>")
            .field("session_repository", &"Arc<dyn SessionRepository>")
            .field("config_service", &"Arc<dyn ConfigService>")
            .field("generation_service", &"Arc<dyn GenerationService>")
            .field("event_service", &"Arc<dyn EventService>")
            .finish()
    }
}
