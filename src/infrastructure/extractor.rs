// src/infrastructure/extractor.rs
//! Turns a page's HTML into an [`ExtractedDocument`].
//!
//! Mirrors what a reader sees: the main content region is selected by a
//! small list of semantic markers, chrome (navigation, headers, footers,
//! ad-pattern blocks) is excluded, and statically hidden elements are
//! skipped throughout.

use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Predicate};
use tracing::debug;

use crate::domain::content::{
    domain_from_url, ExtractedDocument, Heading, Link, ELLIPSIS, LINK_CAP, MAIN_TEXT_CAP,
    MIN_PARAGRAPH_CHARS, PARAGRAPH_CAP,
};

/// Content-region class names tried after the semantic elements.
const CONTENT_CLASSES: [&str; 6] = [
    "content",
    "main-content",
    "post",
    "article",
    "entry-content",
    "post-content",
];

const CONTENT_IDS: [&str; 2] = ["content", "main-content"];

/// Elements whose subtrees never contribute text.
const EXCLUDED_TAGS: [&str; 7] = [
    "nav", "header", "footer", "aside", "script", "style", "noscript",
];

/// Class tokens that mark page chrome rather than content.
const EXCLUDED_CLASS_TOKENS: [&str; 8] = [
    "navigation",
    "menu",
    "sidebar",
    "footer",
    "header",
    "social-share",
    "share-buttons",
    "comments",
];

/// Open Graph properties worth keeping.
const OPEN_GRAPH_KEYS: [&str; 5] = ["title", "description", "type", "url", "site_name"];

/// Extract a structured document from raw HTML. Read-only: the parsed tree
/// is never mutated, exclusions are applied during the walk.
pub fn extract_document(html: &str, url: &str) -> ExtractedDocument {
    let document = Document::from(html);

    let title = document
        .find(Name("title"))
        .next()
        .map(|node| collapse_whitespace(&node.text()))
        .unwrap_or_default();

    let main_text = match main_region(&document) {
        Some(region) => {
            let mut raw = String::new();
            collect_text(&region, &mut raw);
            cap_chars(&collapse_whitespace(&raw), MAIN_TEXT_CAP)
        }
        None => String::new(),
    };

    let extracted = ExtractedDocument {
        title,
        meta_description: meta_content(&document, "description"),
        meta_keywords: meta_content(&document, "keywords"),
        open_graph: open_graph(&document),
        main_text,
        headings: headings(&document),
        paragraphs: paragraphs(&document),
        links: links(&document),
        url: url.to_string(),
        domain: domain_from_url(url),
    };

    debug!(
        url,
        text_chars = extracted.main_text.chars().count(),
        headings = extracted.headings.len(),
        "page content extracted"
    );
    extracted
}

/// First visible match of the content-region selectors, in priority order;
/// the whole body otherwise.
fn main_region<'a>(document: &'a Document) -> Option<Node<'a>> {
    if let Some(node) = first_visible(document, Name("main")) {
        return Some(node);
    }
    if let Some(node) = first_visible(document, Name("article")) {
        return Some(node);
    }
    if let Some(node) = first_visible(document, Attr("role", "main")) {
        return Some(node);
    }
    for class in CONTENT_CLASSES {
        if let Some(node) = first_visible(document, Class(class)) {
            return Some(node);
        }
    }
    for id in CONTENT_IDS {
        if let Some(node) = first_visible(document, Attr("id", id)) {
            return Some(node);
        }
    }

    document.find(Name("body")).next()
}

fn first_visible<'a, P: Predicate>(document: &'a Document, predicate: P) -> Option<Node<'a>> {
    document.find(predicate).find(is_visible)
}

/// Static rendition of the live-DOM visibility test: inline styles and the
/// `hidden` attribute, checked up the ancestor chain. Layout-dependent
/// checks (zero-size boxes) have no static equivalent and are skipped.
fn is_visible(node: &Node) -> bool {
    let mut current = Some(*node);
    while let Some(n) = current {
        if n.name().is_some() && element_hidden(&n) {
            return false;
        }
        current = n.parent();
    }
    true
}

fn element_hidden(node: &Node) -> bool {
    if node.attr("hidden").is_some() {
        return true;
    }

    let Some(style) = node.attr("style") else {
        return false;
    };

    for declaration in style.split(';') {
        let Some((property, value)) = declaration.split_once(':') else {
            continue;
        };
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();

        match property.as_str() {
            "display" if value == "none" => return true,
            "visibility" if value == "hidden" => return true,
            "opacity" => {
                if value.parse::<f64>().map(|o| o == 0.0).unwrap_or(false) {
                    return true;
                }
            }
            _ => {}
        }
    }

    false
}

/// Chrome and ad-pattern detection, matching on element names, class
/// tokens, and the broad `ad` substring in class/id values.
fn is_excluded(node: &Node) -> bool {
    if let Some(name) = node.name() {
        if EXCLUDED_TAGS.contains(&name) {
            return true;
        }
    }

    if let Some(class) = node.attr("class") {
        let lower = class.to_ascii_lowercase();
        if lower
            .split_whitespace()
            .any(|token| EXCLUDED_CLASS_TOKENS.contains(&token))
        {
            return true;
        }
        if lower.contains("ad") {
            return true;
        }
    }

    if let Some(id) = node.attr("id") {
        if id.to_ascii_lowercase().contains("ad") {
            return true;
        }
    }

    false
}

/// Depth-first text collection, pruning excluded and hidden subtrees.
fn collect_text(node: &Node, out: &mut String) {
    if let Some(text) = node.as_text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(trimmed);
        }
        return;
    }

    if node.name().is_some() && (is_excluded(node) || element_hidden(node)) {
        return;
    }

    for child in node.children() {
        collect_text(&child, out);
    }
}

fn meta_content(document: &Document, name: &str) -> String {
    document
        .find(Name("meta").and(Attr("name", name)))
        .next()
        .and_then(|node| node.attr("content"))
        .unwrap_or_default()
        .to_string()
}

fn open_graph(document: &Document) -> std::collections::BTreeMap<String, String> {
    let mut tags = std::collections::BTreeMap::new();
    for key in OPEN_GRAPH_KEYS {
        let property = format!("og:{}", key);
        if let Some(content) = document
            .find(Name("meta").and(Attr("property", property.as_str())))
            .next()
            .and_then(|node| node.attr("content"))
        {
            if !content.is_empty() {
                tags.insert(key.to_string(), content.to_string());
            }
        }
    }
    tags
}

/// All visible h1-h3 headings, unfiltered by count.
fn headings(document: &Document) -> Vec<Heading> {
    document
        .find(Name("h1").or(Name("h2")).or(Name("h3")))
        .filter(is_visible)
        .filter_map(|node| {
            let level = match node.name() {
                Some("h1") => 1,
                Some("h2") => 2,
                Some("h3") => 3,
                _ => return None,
            };
            let text = collapse_whitespace(&node.text());
            if text.is_empty() {
                None
            } else {
                Some(Heading { level, text })
            }
        })
        .collect()
}

/// Visible paragraphs of at least [`MIN_PARAGRAPH_CHARS`], first
/// [`PARAGRAPH_CAP`] only.
fn paragraphs(document: &Document) -> Vec<String> {
    document
        .find(Name("p"))
        .filter(is_visible)
        .map(|node| collapse_whitespace(&node.text()))
        .filter(|text| text.chars().count() >= MIN_PARAGRAPH_CHARS)
        .take(PARAGRAPH_CAP)
        .collect()
}

/// Visible anchors with text and a real target, first [`LINK_CAP`] only.
fn links(document: &Document) -> Vec<Link> {
    document
        .find(Name("a"))
        .filter(is_visible)
        .filter_map(|node| {
            let text = collapse_whitespace(&node.text());
            let href = node.attr("href").unwrap_or_default();
            if text.is_empty()
                || href.is_empty()
                || href.starts_with('#')
                || href.starts_with("javascript:")
            {
                None
            } else {
                Some(Link {
                    text,
                    href: href.to_string(),
                })
            }
        })
        .take(LINK_CAP)
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Bound text to `cap` characters including the truncation marker.
fn cap_chars(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let mut capped: String = text
        .chars()
        .take(cap.saturating_sub(ELLIPSIS.len()))
        .collect();
    capped.push_str(ELLIPSIS);
    capped
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <html>
          <head>
            <title>  Example   Article </title>
            <meta name="description" content="An example page">
            <meta name="keywords" content="example, test">
            <meta property="og:title" content="Example OG">
            <meta property="og:site_name" content="Example Site">
          </head>
          <body>
            <nav><a href="/home">Home</a> navigation chrome</nav>
            <header>site banner</header>
            <article>
              <h1>Main heading</h1>
              <h2 style="display: none">Hidden heading</h2>
              <p>This paragraph carries the core of the article text.</p>
              <p>short</p>
              <div class="advertisement">Buy things now!</div>
              <script>var tracking = true;</script>
              <a href="https://example.com/next">Next article</a>
              <a href="#section">Jump</a>
              <a href="javascript:void(0)">Noop</a>
            </article>
            <footer>copyright notice</footer>
          </body>
        </html>
    "##;

    #[test]
    fn given_article_page_when_extracted_then_main_region_is_the_article() {
        let doc = extract_document(PAGE, "https://www.example.com/article");

        assert!(doc.main_text.contains("core of the article"));
        assert!(!doc.main_text.contains("navigation chrome"));
        assert!(!doc.main_text.contains("site banner"));
        assert!(!doc.main_text.contains("copyright notice"));
        assert!(!doc.main_text.contains("Buy things"));
        assert!(!doc.main_text.contains("tracking"));
    }

    #[test]
    fn given_page_when_extracted_then_metadata_is_captured() {
        let doc = extract_document(PAGE, "https://www.example.com/article");

        assert_eq!(doc.title, "Example Article");
        assert_eq!(doc.meta_description, "An example page");
        assert_eq!(doc.meta_keywords, "example, test");
        assert_eq!(doc.open_graph.get("title").unwrap(), "Example OG");
        assert_eq!(doc.open_graph.get("site_name").unwrap(), "Example Site");
        assert_eq!(doc.domain, "example.com");
    }

    #[test]
    fn given_hidden_heading_when_extracted_then_it_is_skipped() {
        let doc = extract_document(PAGE, "https://example.com");

        let texts: Vec<&str> = doc.headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, vec!["Main heading"]);
        assert_eq!(doc.headings[0].level, 1);
    }

    #[test]
    fn given_short_paragraph_when_extracted_then_it_is_dropped() {
        let doc = extract_document(PAGE, "https://example.com");

        assert_eq!(doc.paragraphs.len(), 1);
        assert!(doc.paragraphs[0].starts_with("This paragraph"));
    }

    #[test]
    fn given_fragment_and_script_links_when_extracted_then_only_real_links_remain() {
        let doc = extract_document(PAGE, "https://example.com");

        let hrefs: Vec<&str> = doc.links.iter().map(|l| l.href.as_str()).collect();
        assert!(hrefs.contains(&"https://example.com/next"));
        assert!(!hrefs.iter().any(|h| h.starts_with('#')));
        assert!(!hrefs.iter().any(|h| h.starts_with("javascript:")));
    }

    #[test]
    fn given_no_semantic_region_when_extracted_then_body_is_used() {
        let html = "<html><body><p>Plain body text, long enough to matter.</p></body></html>";
        let doc = extract_document(html, "https://example.com");
        assert!(doc.main_text.contains("Plain body text"));
    }

    #[test]
    fn given_invisible_region_when_selecting_then_next_candidate_wins() {
        let html = r#"
            <html><body>
              <main style="display:none"><p>invisible main content here</p></main>
              <article><p>visible article content here</p></article>
            </body></html>
        "#;
        let doc = extract_document(html, "https://example.com");
        assert!(doc.main_text.contains("visible article"));
        assert!(!doc.main_text.contains("invisible main"));
    }

    #[test]
    fn given_half_opacity_when_checked_then_not_hidden() {
        let html = r#"<html><body><main style="opacity: 0.5"><p>faded but readable text</p></main></body></html>"#;
        let doc = extract_document(html, "https://example.com");
        assert!(doc.main_text.contains("faded but readable"));

        let hidden = r#"<html><body><main style="opacity: 0"><p>fully transparent text</p></main><article><p>fallback text region</p></article></body></html>"#;
        let doc = extract_document(hidden, "https://example.com");
        assert!(!doc.main_text.contains("fully transparent"));
    }

    #[test]
    fn given_huge_page_when_extracted_then_main_text_is_capped() {
        let body = format!(
            "<html><body><article><p>{}</p></article></body></html>",
            "word ".repeat(2000)
        );
        let doc = extract_document(&body, "https://example.com");

        assert!(doc.main_text.chars().count() <= MAIN_TEXT_CAP);
        assert!(doc.main_text.ends_with(ELLIPSIS));
    }

    #[test]
    fn given_many_paragraphs_and_links_when_extracted_then_caps_apply() {
        let paragraphs: String = (0..30)
            .map(|i| format!("<p>Paragraph number {} with plenty of text.</p>", i))
            .collect();
        let links: String = (0..40)
            .map(|i| format!("<a href=\"/l{}\">link number {}</a>", i, i))
            .collect();
        let html = format!("<html><body><article>{}{}</article></body></html>", paragraphs, links);

        let doc = extract_document(&html, "https://example.com");
        assert_eq!(doc.paragraphs.len(), PARAGRAPH_CAP);
        assert_eq!(doc.links.len(), LINK_CAP);
    }
}
