// src/application/services/tag_parser.rs
//! Extracts a normalized tag list from raw model output.
//!
//! Total: any input string yields between 0 and [`MAX_TAGS_PER_RESPONSE`]
//! valid tags, never an error. Models wrap their answers in commentary
//! often enough that the parser first tries to isolate the `#tag` run.

use std::sync::OnceLock;

use regex::Regex;

use crate::domain::tag::Tag;

/// At most this many tags are accepted from one model response.
pub const MAX_TAGS_PER_RESPONSE: usize = 10;

/// Punctuation stripped from token ends, CJK and Latin terminators.
const TRAILING_PUNCTUATION: [char; 13] = [
    '。', '，', '、', '.', ',', ';', ':', '!', '?', '！', '？', '：', '；',
];

/// A contiguous run of `#token` groups, tolerating trailing punctuation
/// between tokens.
fn tag_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"#[\w\p{Han}]+[。，、.,;:!?！？：；]*(?:\s+#[\w\p{Han}]+[。，、.,;:!?！？：；]*)*")
            .expect("tag run pattern is valid")
    })
}

/// Parse tags out of a model response.
pub fn parse_tags(response_text: &str) -> Vec<Tag> {
    let trimmed = response_text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    let text = match tag_run_regex().find(trimmed) {
        Some(run) => run.as_str(),
        None => trimmed,
    };

    let mut tags: Vec<Tag> = Vec::new();
    for part in text.split_whitespace() {
        let token = part.strip_prefix('#').unwrap_or(part);
        let token = token.trim_end_matches(|c| TRAILING_PUNCTUATION.contains(&c));

        let Ok(tag) = Tag::new(token) else {
            continue;
        };
        if !tags.contains(&tag) {
            tags.push(tag);
        }
        if tags.len() == MAX_TAGS_PER_RESPONSE {
            break;
        }
    }

    tags
}
