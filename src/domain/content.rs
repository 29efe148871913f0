// src/domain/content.rs
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Hard cap on extracted main text, in characters.
pub const MAIN_TEXT_CAP: usize = 3000;
/// At most this many paragraphs are kept per page.
pub const PARAGRAPH_CAP: usize = 10;
/// At most this many links are kept per page.
pub const LINK_CAP: usize = 20;
/// Paragraphs shorter than this are considered noise.
pub const MIN_PARAGRAPH_CHARS: usize = 10;
/// Marker appended wherever text has been truncated.
pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading level, 1 through 3.
    pub level: u8,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub href: String,
}

/// Raw structured content scraped from a loaded page.
///
/// Produced by the content extractor, consumed by the cleaner, then
/// discarded or cached in cleaned form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
    pub open_graph: BTreeMap<String, String>,
    /// Concatenated visible text of the main content region,
    /// at most [`MAIN_TEXT_CAP`] characters.
    pub main_text: String,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
    pub links: Vec<Link>,
    pub url: String,
    pub domain: String,
}

/// The normalized, length-budgeted subset of a page used for prompting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanedContent {
    pub title: String,
    pub description: String,
    pub content: String,
    pub domain: String,
    pub url: String,
    pub headings: Vec<Heading>,
    pub paragraphs: Vec<String>,
}

impl CleanedContent {
    /// Minimal content record for the degraded path: title, URL and derived
    /// domain only, no page access.
    pub fn from_title_and_url(title: &str, url: &str) -> Self {
        Self {
            title: title.to_string(),
            description: String::new(),
            content: url.to_string(),
            domain: domain_from_url(url),
            url: url.to_string(),
            headings: Vec::new(),
            paragraphs: Vec::new(),
        }
    }
}

/// Derive a display domain from a URL, dropping any `www.` prefix.
///
/// Falls back to a crude authority scrape when the URL does not parse.
pub fn domain_from_url(raw: &str) -> String {
    if let Ok(parsed) = url::Url::parse(raw) {
        if let Some(host) = parsed.host_str() {
            return host.strip_prefix("www.").unwrap_or(host).to_string();
        }
    }

    let rest = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"));
    match rest {
        Some(rest) => {
            let authority = rest.split('/').next().unwrap_or_default();
            authority
                .strip_prefix("www.")
                .unwrap_or(authority)
                .to_string()
        }
        None => String::new(),
    }
}
