// src/application/services/content_cleaner.rs
//! Normalizes extracted page content and bounds it to a character budget.
//!
//! Cleaning is idempotent: re-cleaning already-cleaned content must not
//! change it, so cached cleaned records can be passed through again safely.

use crate::domain::content::{CleanedContent, ExtractedDocument, ELLIPSIS};

/// Default total character budget for a cleaned content record.
pub const DEFAULT_CONTENT_BUDGET: usize = 3000;

/// Characters held back from the budget as slack for prompt framing.
const BUDGET_RESERVE: usize = 100;

/// Sentence terminators considered acceptable cut points, CJK and Latin.
const SENTENCE_TERMINATORS: [char; 6] = ['。', '！', '？', '.', '!', '?'];

/// Collapse whitespace runs, strip control characters (line breaks
/// excepted) and normalize line endings.
pub fn clean_text(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut cleaned = String::with_capacity(normalized.len());
    let mut pending_space = false;
    for c in normalized.chars() {
        if c == '\n' {
            // Line breaks survive; surrounding horizontal whitespace does not.
            pending_space = false;
            if !cleaned.ends_with('\n') {
                while cleaned.ends_with(' ') {
                    cleaned.pop();
                }
                cleaned.push('\n');
            }
        } else if c.is_whitespace() {
            pending_space = true;
        } else if c.is_control() {
            continue;
        } else {
            if pending_space && !cleaned.is_empty() && !cleaned.ends_with('\n') {
                cleaned.push(' ');
            }
            pending_space = false;
            cleaned.push(c);
        }
    }

    cleaned.trim_matches('\n').trim().to_string()
}

/// Bound a content record to `max_len` characters, allocating in strict
/// priority order: title and description are always kept whole, then h1/h2
/// headings while they fit, then main text (cut at a sentence boundary when
/// that keeps at least 80% of the available room), then leading paragraphs.
pub fn limit_content_length(content: &CleanedContent, max_len: usize) -> CleanedContent {
    let mut result = CleanedContent {
        title: content.title.clone(),
        description: content.description.clone(),
        content: String::new(),
        domain: content.domain.clone(),
        url: content.url.clone(),
        headings: Vec::new(),
        paragraphs: Vec::new(),
    };

    let used = char_len(&content.title) + char_len(&content.description);
    let mut remaining = max_len.saturating_sub(used + BUDGET_RESERVE);
    if remaining == 0 {
        return result;
    }

    for heading in content.headings.iter().filter(|h| h.level <= 2) {
        let len = char_len(&heading.text);
        if len > remaining {
            break;
        }
        result.headings.push(heading.clone());
        remaining -= len;
    }

    if !content.content.is_empty() && remaining > 0 {
        result.content = truncate_at_sentence(&content.content, remaining);
        remaining -= char_len(&result.content);
    }

    for paragraph in &content.paragraphs {
        let len = char_len(paragraph);
        if len > remaining {
            break;
        }
        result.paragraphs.push(paragraph.clone());
        remaining -= len;
    }

    result
}

/// Clean a freshly extracted document into the prompt-facing record.
pub fn clean_document(document: &ExtractedDocument) -> CleanedContent {
    let cleaned = CleanedContent {
        title: clean_text(&document.title),
        description: clean_text(&document.meta_description),
        content: clean_text(&document.main_text),
        domain: document.domain.clone(),
        url: document.url.clone(),
        headings: document
            .headings
            .iter()
            .map(|h| crate::domain::content::Heading {
                level: h.level,
                text: clean_text(&h.text),
            })
            .filter(|h| !h.text.is_empty())
            .collect(),
        paragraphs: document
            .paragraphs
            .iter()
            .map(|p| clean_text(p))
            .filter(|p| !p.is_empty())
            .collect(),
    };

    limit_content_length(&cleaned, DEFAULT_CONTENT_BUDGET)
}

/// Re-clean an already cleaned record; a fixed point of the cleaning
/// pipeline.
pub fn clean_content(content: &CleanedContent) -> CleanedContent {
    let cleaned = CleanedContent {
        title: clean_text(&content.title),
        description: clean_text(&content.description),
        content: clean_text(&content.content),
        domain: content.domain.clone(),
        url: content.url.clone(),
        headings: content
            .headings
            .iter()
            .map(|h| crate::domain::content::Heading {
                level: h.level,
                text: clean_text(&h.text),
            })
            .filter(|h| !h.text.is_empty())
            .collect(),
        paragraphs: content
            .paragraphs
            .iter()
            .map(|p| clean_text(p))
            .filter(|p| !p.is_empty())
            .collect(),
    };

    limit_content_length(&cleaned, DEFAULT_CONTENT_BUDGET)
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` down to at most `budget` characters, preferring the last
/// sentence terminator when that cut keeps >= 80% of the budget.
fn truncate_at_sentence(text: &str, budget: usize) -> String {
    let total = char_len(text);
    if total <= budget {
        return text.to_string();
    }

    let cut: String = text.chars().take(budget).collect();
    let last_terminator = cut
        .chars()
        .enumerate()
        .filter(|(_, c)| SENTENCE_TERMINATORS.contains(c))
        .map(|(i, _)| i)
        .last();

    match last_terminator {
        Some(index) if (index + 1) * 10 >= budget * 8 => cut.chars().take(index + 1).collect(),
        _ => {
            if budget <= ELLIPSIS.len() {
                return cut;
            }
            let mut hard: String = cut.chars().take(budget - ELLIPSIS.len()).collect();
            hard.push_str(ELLIPSIS);
            hard
        }
    }
}
