// src/domain/services/page_source.rs
use std::fmt::Debug;
use std::time::Duration;

use thiserror::Error;

use crate::domain::content::ExtractedDocument;

#[derive(Error, Debug)]
pub enum PageSourceError {
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Content extraction timed out")]
    Timeout,

    #[error("Page not reachable: {0}")]
    Unreachable(String),

    #[error("Content extraction failed: {0}")]
    Extraction(String),
}

pub type PageSourceResult<T> = Result<T, PageSourceError>;

/// A located, live page that content can be extracted from — the analogue
/// of an open browser tab showing the bookmark's URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageHandle {
    url: String,
}

impl PageHandle {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Access to live page content.
///
/// `locate` answers whether a page for the URL can currently be read at all
/// (`Ok(None)` when it cannot); `fetch_document` performs the extraction
/// within a bounded time. A failure at either step sends the generation
/// pipeline down its degraded path, never to a hard stop.
pub trait PageSource: Send + Sync + Debug {
    fn locate(&self, url: &str) -> PageSourceResult<Option<PageHandle>>;

    fn fetch_document(
        &self,
        handle: &PageHandle,
        timeout: Duration,
    ) -> PageSourceResult<ExtractedDocument>;
}
