// src/application/services/generation_service_impl.rs
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::config_service::ConfigService;
use crate::application::services::content_cache::{ContentCache, DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::application::services::content_cleaner::clean_document;
use crate::application::services::generation_service::{GenerationOutcome, GenerationService};
use crate::application::services::prompt_builder::build_prompt;
use crate::application::services::tag_parser::parse_tags;
use crate::domain::api_config::ApiConfig;
use crate::domain::bookmark::Bookmark;
use crate::domain::content::CleanedContent;
use crate::domain::gateway::ChatGateway;
use crate::domain::repositories::repository::TagRepository;
use crate::domain::services::page_source::PageSource;
use crate::domain::tag::Tag;
use crate::util::sync::KeyedLocks;

/// Bound on the page-extraction step in the interactive path.
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(10);

pub struct GenerationServiceImpl {
    config_service: Arc<dyn ConfigService>,
    tag_repository: Arc<dyn TagRepository>,
    page_source: Arc<dyn PageSource>,
    gateway: Arc<dyn ChatGateway>,
    cache: Mutex<ContentCache>,
    run_locks: KeyedLocks,
    extraction_timeout: Duration,
}

impl GenerationServiceImpl {
    pub fn new(
        config_service: Arc<dyn ConfigService>,
        tag_repository: Arc<dyn TagRepository>,
        page_source: Arc<dyn PageSource>,
        gateway: Arc<dyn ChatGateway>,
    ) -> Self {
        Self::with_options(
            config_service,
            tag_repository,
            page_source,
            gateway,
            DEFAULT_CAPACITY,
            DEFAULT_TTL,
            DEFAULT_EXTRACTION_TIMEOUT,
        )
    }

    pub fn with_options(
        config_service: Arc<dyn ConfigService>,
        tag_repository: Arc<dyn TagRepository>,
        page_source: Arc<dyn PageSource>,
        gateway: Arc<dyn ChatGateway>,
        cache_capacity: usize,
        cache_ttl: Duration,
        extraction_timeout: Duration,
    ) -> Self {
        debug!("Creating new GenerationServiceImpl");
        Self {
            config_service,
            tag_repository,
            page_source,
            gateway,
            cache: Mutex::new(ContentCache::new(cache_capacity, cache_ttl)),
            run_locks: KeyedLocks::new(),
            extraction_timeout,
        }
    }

    /// Cleaned content for the bookmark's URL: cache hit, or locate + fetch
    /// + clean + cache. `None` sends the caller to the degraded path.
    fn obtain_content(&self, url: &str) -> Option<CleanedContent> {
        if let Some(hit) = self.cache.lock().expect("content cache poisoned").get(url) {
            debug!(url, "using cached page content");
            return Some(hit);
        }

        let handle = match self.page_source.locate(url) {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                debug!(url, "no live page available");
                return None;
            }
            Err(e) => {
                warn!(url, "page lookup failed: {}", e);
                return None;
            }
        };

        match self
            .page_source
            .fetch_document(&handle, self.extraction_timeout)
        {
            Ok(document) => {
                let cleaned = clean_document(&document);
                self.cache
                    .lock()
                    .expect("content cache poisoned")
                    .insert(url, cleaned.clone());
                Some(cleaned)
            }
            Err(e) => {
                warn!(url, "content extraction failed: {}", e);
                None
            }
        }
    }

    /// One prompt → call → parse → merge round. `Ok(None)` is the soft
    /// failure of an empty parse; gateway trouble comes back as an error
    /// for the caller to route.
    fn run_generation(
        &self,
        config: &ApiConfig,
        bookmark_id: &str,
        content: &CleanedContent,
    ) -> ApplicationResult<Option<Vec<Tag>>> {
        let existing = self.tag_repository.get_tags(bookmark_id);
        let prompt = build_prompt(content, &existing);

        let response = self.gateway.complete(config, &prompt)?;

        let new_tags = parse_tags(&response);
        if new_tags.is_empty() {
            return Ok(None);
        }

        let merged = self.tag_repository.merge_tags(bookmark_id, &new_tags)?;
        Ok(Some(merged))
    }

    /// Degraded path: title, URL and derived domain only, no page access.
    fn generate_degraded(
        &self,
        config: &ApiConfig,
        bookmark: &Bookmark,
    ) -> ApplicationResult<GenerationOutcome> {
        debug!(bookmark_id = %bookmark.id, "generating tags from title and URL only");
        let content = CleanedContent::from_title_and_url(&bookmark.title, &bookmark.url);

        match self.run_generation(config, &bookmark.id, &content) {
            Ok(Some(tags)) => Ok(GenerationOutcome::Degraded { tags }),
            Ok(None) => {
                warn!(bookmark_id = %bookmark.id, "no tags parsed on the degraded path");
                Ok(GenerationOutcome::Failed {
                    reason: "no tags could be parsed from the model response".to_string(),
                })
            }
            Err(ApplicationError::Gateway(e)) => {
                warn!(bookmark_id = %bookmark.id, "degraded generation failed: {}", e);
                Ok(GenerationOutcome::Failed {
                    reason: e.to_string(),
                })
            }
            Err(other) => Err(other),
        }
    }
}

impl GenerationService for GenerationServiceImpl {
    #[instrument(skip(self, bookmark), level = "debug", fields(bookmark_id = %bookmark.id))]
    fn generate_for_bookmark(&self, bookmark: &Bookmark) -> ApplicationResult<GenerationOutcome> {
        let config = self.config_service.get_config();
        if !config.enabled {
            debug!("tag generation disabled, skipping");
            return Ok(GenerationOutcome::Skipped);
        }
        if !config.validate().is_valid() {
            debug!("API config incomplete, skipping");
            return Ok(GenerationOutcome::Skipped);
        }

        // Concurrent triggers for the same bookmark take turns.
        let key_lock = self.run_locks.acquire(&bookmark.id);
        let _guard = key_lock.lock().expect("generation run lock poisoned");

        match self.obtain_content(&bookmark.url) {
            Some(content) => match self.run_generation(&config, &bookmark.id, &content) {
                Ok(Some(tags)) => {
                    debug!(count = tags.len(), "tags generated from page content");
                    Ok(GenerationOutcome::Generated { tags })
                }
                Ok(None) => {
                    warn!("no tags parsed from model response, falling back");
                    self.generate_degraded(&config, bookmark)
                }
                Err(ApplicationError::Gateway(e)) => {
                    warn!("generation from page content failed: {}", e);
                    self.generate_degraded(&config, bookmark)
                }
                Err(other) => Err(other),
            },
            None => self.generate_degraded(&config, bookmark),
        }
    }

    fn evict_expired_content(&self) -> usize {
        self.cache
            .lock()
            .expect("content cache poisoned")
            .evict_expired()
    }
}

impl std::fmt::Debug for GenerationServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationServiceImpl")
            .field("extraction_timeout", &self.extraction_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::config_service::ConfigService;
    use crate::application::ConfigServiceImpl;
    use crate::domain::api_config::{ApiConfig, ApiProvider};
    use crate::domain::bookmark::BookmarkBuilder;
    use crate::domain::gateway::GatewayError;
    use crate::infrastructure::repositories::in_memory_store::InMemoryStorageArea;
    use crate::infrastructure::repositories::tag_repository::KvTagRepository;
    use crate::util::testing::{
        init_test_env, sample_document, PageBehavior, ScriptedGateway, StubPageSource,
    };

    struct Fixture {
        service: GenerationServiceImpl,
        tag_repository: Arc<KvTagRepository>,
        gateway: Arc<ScriptedGateway>,
        page_source: Arc<StubPageSource>,
    }

    fn fixture(behavior: PageBehavior, gateway: ScriptedGateway, enabled: bool) -> Fixture {
        let _ = init_test_env();

        let storage = Arc::new(InMemoryStorageArea::new());
        let config_service = Arc::new(ConfigServiceImpl::new(storage.clone()));
        if enabled {
            let config = ApiConfig {
                provider: ApiProvider::Custom,
                endpoint: "https://llm.test/v1/chat".to_string(),
                api_key: "test-key".to_string(),
                enabled: true,
                ..ApiConfig::default()
            };
            config_service.save_config(&config, true).unwrap();
        }

        let tag_repository = Arc::new(KvTagRepository::new(storage));
        let gateway = Arc::new(gateway);
        let page_source = Arc::new(StubPageSource::new(behavior));

        let service = GenerationServiceImpl::new(
            config_service,
            tag_repository.clone(),
            page_source.clone(),
            gateway.clone(),
        );

        Fixture {
            service,
            tag_repository,
            gateway,
            page_source,
        }
    }

    fn bookmark() -> crate::domain::bookmark::Bookmark {
        BookmarkBuilder::default()
            .id("bm-1")
            .title("Example Page")
            .url("https://www.example.com/article")
            .build()
            .unwrap()
    }

    #[test]
    fn given_disabled_feature_when_generating_then_skipped_without_any_call() {
        let fx = fixture(
            PageBehavior::document(sample_document()),
            ScriptedGateway::respond_with("#rust"),
            false,
        );

        let outcome = fx.service.generate_for_bookmark(&bookmark()).unwrap();
        assert_eq!(outcome, GenerationOutcome::Skipped);
        assert!(fx.gateway.prompts().is_empty());
        assert_eq!(fx.page_source.locate_calls(), 0);
    }

    #[test]
    fn given_live_page_when_generating_then_tags_are_merged_and_persisted() {
        let fx = fixture(
            PageBehavior::document(sample_document()),
            ScriptedGateway::respond_with("#rust #cli #tools"),
            true,
        );

        let outcome = fx.service.generate_for_bookmark(&bookmark()).unwrap();
        assert!(matches!(outcome, GenerationOutcome::Generated { .. }));

        let tags: Vec<&str> = outcome.tags().iter().map(|t| t.value()).collect();
        assert_eq!(tags, vec!["rust", "cli", "tools"]);

        let persisted = fx.tag_repository.get_tags("bm-1");
        assert_eq!(persisted.len(), 3);
    }

    #[test]
    fn given_repeated_runs_when_generating_then_content_comes_from_the_cache() {
        let fx = fixture(
            PageBehavior::document(sample_document()),
            ScriptedGateway::respond_with("#rust"),
            true,
        );

        fx.service.generate_for_bookmark(&bookmark()).unwrap();
        fx.service.generate_for_bookmark(&bookmark()).unwrap();

        assert_eq!(fx.page_source.fetch_calls(), 1);
        assert_eq!(fx.gateway.prompts().len(), 2);
    }

    #[test]
    fn given_extraction_timeout_when_generating_then_degraded_path_is_used() {
        let fx = fixture(
            PageBehavior::TimeoutOnFetch,
            ScriptedGateway::respond_with("#备用 #标签"),
            true,
        );

        let outcome = fx.service.generate_for_bookmark(&bookmark()).unwrap();
        assert!(matches!(outcome, GenerationOutcome::Degraded { .. }));

        // The degraded prompt is built from title and URL only.
        let prompts = fx.gateway.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Title: Example Page"));
        assert!(prompts[0].contains("Domain: example.com"));
        assert!(!prompts[0].contains("Main heading"));
    }

    #[test]
    fn given_no_live_page_when_generating_then_degraded_path_is_used() {
        let fx = fixture(
            PageBehavior::NoLivePage,
            ScriptedGateway::respond_with("#tag"),
            true,
        );

        let outcome = fx.service.generate_for_bookmark(&bookmark()).unwrap();
        assert!(matches!(outcome, GenerationOutcome::Degraded { .. }));
        assert_eq!(fx.page_source.fetch_calls(), 0);
    }

    #[test]
    fn given_unparseable_response_when_generating_then_fallback_call_is_made() {
        let fx = fixture(
            PageBehavior::document(sample_document()),
            ScriptedGateway::new(vec![
                Ok("I'm sorry, I can't help with that.".to_string()),
                Ok("#second #try".to_string()),
            ]),
            true,
        );

        let outcome = fx.service.generate_for_bookmark(&bookmark()).unwrap();
        assert!(matches!(outcome, GenerationOutcome::Degraded { .. }));
        assert_eq!(fx.gateway.prompts().len(), 2);
    }

    #[test]
    fn given_gateway_failure_on_both_paths_when_generating_then_failed_with_reason() {
        let fx = fixture(
            PageBehavior::document(sample_document()),
            ScriptedGateway::new(vec![
                Err(GatewayError::Http {
                    status: 401,
                    body: "unauthorized".to_string(),
                }),
                Err(GatewayError::Timeout),
            ]),
            true,
        );

        let outcome = fx.service.generate_for_bookmark(&bookmark()).unwrap();
        match outcome {
            GenerationOutcome::Failed { reason } => assert!(reason.contains("timed out")),
            other => panic!("expected Failed, got {:?}", other),
        }
        assert!(fx.tag_repository.get_tags("bm-1").is_empty());
    }

    #[test]
    fn given_existing_tags_when_generating_then_union_is_persisted() {
        let fx = fixture(
            PageBehavior::document(sample_document()),
            ScriptedGateway::respond_with("#效率 #AI学习"),
            true,
        );
        fx.tag_repository
            .save_tags("bm-1", &[Tag::new("工作").unwrap()])
            .unwrap();

        let outcome = fx.service.generate_for_bookmark(&bookmark()).unwrap();
        let tags: Vec<&str> = outcome.tags().iter().map(|t| t.value()).collect();
        assert_eq!(tags, vec!["工作", "效率", "AI学习"]);

        let persisted: Vec<String> = fx
            .tag_repository
            .get_tags("bm-1")
            .into_iter()
            .map(|t| t.value().to_string())
            .collect();
        assert_eq!(persisted, vec!["工作", "效率", "AI学习"]);
    }

    #[test]
    fn given_zero_ttl_cache_when_sweeping_then_entries_are_evicted() {
        let _ = init_test_env();
        let storage = Arc::new(InMemoryStorageArea::new());
        let config_service = Arc::new(ConfigServiceImpl::new(storage.clone()));
        let config = ApiConfig {
            provider: ApiProvider::Custom,
            endpoint: "https://llm.test/v1/chat".to_string(),
            api_key: "test-key".to_string(),
            enabled: true,
            ..ApiConfig::default()
        };
        config_service.save_config(&config, true).unwrap();

        let service = GenerationServiceImpl::with_options(
            config_service,
            Arc::new(KvTagRepository::new(storage)),
            Arc::new(StubPageSource::new(PageBehavior::document(
                sample_document(),
            ))),
            Arc::new(ScriptedGateway::respond_with("#tag")),
            8,
            Duration::ZERO,
            DEFAULT_EXTRACTION_TIMEOUT,
        );

        service.generate_for_bookmark(&bookmark()).unwrap();
        assert_eq!(service.evict_expired_content(), 1);
        assert_eq!(service.evict_expired_content(), 0);
    }
}
