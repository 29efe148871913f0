// src/infrastructure/http_page_source.rs
use std::time::Duration;

use tracing::{debug, instrument};

use crate::domain::content::ExtractedDocument;
use crate::domain::services::page_source::{
    PageHandle, PageSource, PageSourceError, PageSourceResult,
};
use crate::infrastructure::extractor;

/// Default bound on the reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Page access over plain HTTP: a HEAD probe stands in for "is there a live
/// page for this URL", a GET plus extraction for reading it.
#[derive(Debug, Clone)]
pub struct HttpPageSource {
    probe_timeout: Duration,
}

impl HttpPageSource {
    pub fn new() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(probe_timeout: Duration) -> Self {
        Self { probe_timeout }
    }

    fn client(timeout: Duration) -> reqwest::blocking::Client {
        reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            // Fallback to default client in case of builder failure
            .unwrap_or_else(|_| reqwest::blocking::Client::new())
    }
}

impl Default for HttpPageSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for HttpPageSource {
    #[instrument(skip(self), level = "debug")]
    fn locate(&self, url: &str) -> PageSourceResult<Option<PageHandle>> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PageSourceError::UnsupportedScheme(url.to_string()));
        }

        let client = Self::client(self.probe_timeout);
        match client.head(url).send() {
            Ok(response) if response.status().is_success() => Ok(Some(PageHandle::new(url))),
            Ok(response) => {
                debug!(status = %response.status(), "page probe refused");
                Ok(None)
            }
            Err(e) => {
                debug!("page probe failed: {}", e);
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, handle), level = "debug", fields(url = handle.url()))]
    fn fetch_document(
        &self,
        handle: &PageHandle,
        timeout: Duration,
    ) -> PageSourceResult<ExtractedDocument> {
        let client = Self::client(timeout);

        let response = client.get(handle.url()).send().map_err(|e| {
            if e.is_timeout() {
                PageSourceError::Timeout
            } else {
                PageSourceError::Unreachable(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(PageSourceError::Unreachable(format!(
                "HTTP status {}",
                response.status()
            )));
        }

        let body = response.text().map_err(|e| {
            if e.is_timeout() {
                PageSourceError::Timeout
            } else {
                PageSourceError::Extraction(e.to_string())
            }
        })?;

        Ok(extractor::extract_document(&body, handle.url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_unsupported_scheme_when_locating_then_error() {
        let source = HttpPageSource::new();
        assert!(matches!(
            source.locate("chrome://settings"),
            Err(PageSourceError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            source.locate("file:///tmp/x.html"),
            Err(PageSourceError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn given_unreachable_host_when_locating_then_no_page_rather_than_error() {
        // Reserved TLD per RFC 2606; resolution fails fast and without I/O
        // to any real host.
        let source = HttpPageSource::with_probe_timeout(Duration::from_millis(200));
        let located = source.locate("https://nothing.invalid/").unwrap();
        assert!(located.is_none());
    }
}
