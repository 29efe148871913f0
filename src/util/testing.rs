// src/util/testing.rs
//! Test support: once-only logging setup, environment guards and stub
//! implementations of the outward-facing ports.

use std::collections::VecDeque;
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::domain::api_config::ApiConfig;
use crate::domain::content::{ExtractedDocument, Heading};
use crate::domain::gateway::{ChatGateway, GatewayError, GatewayResult};
use crate::domain::services::page_source::{
    PageHandle, PageSource, PageSourceError, PageSourceResult,
};

static TEST_ENV: OnceLock<()> = OnceLock::new();

/// Initializes test logging exactly once. Subsequent calls do nothing.
pub fn init_test_env() {
    TEST_ENV.get_or_init(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "debug");
        }

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Restores `TAGMARK_*` environment variables on drop.
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

const GUARDED_VARS: [&str; 3] = [
    "TAGMARK_DB_URL",
    "TAGMARK_CACHE_CAPACITY",
    "TAGMARK_EXTRACTION_TIMEOUT_MS",
];

impl EnvGuard {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let saved = GUARDED_VARS
            .iter()
            .map(|name| (*name, env::var(name).ok()))
            .collect();
        for name in GUARDED_VARS {
            env::remove_var(name);
        }
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (name, value) in &self.saved {
            match value {
                Some(value) => env::set_var(name, value),
                None => env::remove_var(name),
            }
        }
    }
}

/// A document with enough texture to exercise the cleaner and the prompt
/// builder.
pub fn sample_document() -> ExtractedDocument {
    ExtractedDocument {
        title: "Example Article".to_string(),
        meta_description: "An example page about things".to_string(),
        main_text: "This article explains things in satisfying detail.".to_string(),
        headings: vec![Heading {
            level: 1,
            text: "Main heading".to_string(),
        }],
        paragraphs: vec!["A paragraph with enough text to count.".to_string()],
        url: "https://www.example.com/article".to_string(),
        domain: "example.com".to_string(),
        ..ExtractedDocument::default()
    }
}

/// Gateway stub that replays a scripted sequence of responses and records
/// every prompt it was handed.
#[derive(Debug)]
pub struct ScriptedGateway {
    script: Mutex<VecDeque<GatewayResult<String>>>,
    repeated: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    /// Responses consumed in order; exhausted scripts answer with a
    /// network error.
    pub fn new(script: Vec<GatewayResult<String>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            repeated: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// The same response for every call.
    pub fn respond_with<S: Into<String>>(text: S) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            repeated: Some(text.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt log poisoned").clone()
    }
}

impl ChatGateway for ScriptedGateway {
    fn complete(&self, _config: &ApiConfig, prompt: &str) -> GatewayResult<String> {
        self.prompts
            .lock()
            .expect("prompt log poisoned")
            .push(prompt.to_string());

        if let Some(next) = self.script.lock().expect("script poisoned").pop_front() {
            return next;
        }
        match &self.repeated {
            Some(text) => Ok(text.clone()),
            None => Err(GatewayError::Network("gateway script exhausted".to_string())),
        }
    }
}

/// How a [`StubPageSource`] behaves.
#[derive(Debug)]
pub enum PageBehavior {
    /// Locating succeeds and fetching yields this document.
    Document(Box<ExtractedDocument>),
    /// No live page for any URL.
    NoLivePage,
    /// Locating succeeds but fetching times out.
    TimeoutOnFetch,
    /// Locating itself fails.
    UnreachableOnLocate,
}

impl PageBehavior {
    pub fn document(document: ExtractedDocument) -> Self {
        PageBehavior::Document(Box::new(document))
    }
}

/// Page-source stub with call counters for cache assertions.
#[derive(Debug)]
pub struct StubPageSource {
    behavior: PageBehavior,
    locate_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl StubPageSource {
    pub fn new(behavior: PageBehavior) -> Self {
        Self {
            behavior,
            locate_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
        }
    }

    pub fn locate_calls(&self) -> usize {
        self.locate_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl PageSource for StubPageSource {
    fn locate(&self, url: &str) -> PageSourceResult<Option<PageHandle>> {
        self.locate_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            PageBehavior::Document(_) | PageBehavior::TimeoutOnFetch => {
                Ok(Some(PageHandle::new(url)))
            }
            PageBehavior::NoLivePage => Ok(None),
            PageBehavior::UnreachableOnLocate => {
                Err(PageSourceError::Unreachable("stubbed outage".to_string()))
            }
        }
    }

    fn fetch_document(
        &self,
        _handle: &PageHandle,
        _timeout: Duration,
    ) -> PageSourceResult<ExtractedDocument> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            PageBehavior::Document(document) => Ok(*document.clone()),
            PageBehavior::TimeoutOnFetch => Err(PageSourceError::Timeout),
            _ => Err(PageSourceError::Extraction(
                "fetch called unexpectedly".to_string(),
            )),
        }
    }
}
