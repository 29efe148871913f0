// src/application/services/prompt_builder.rs
//! Renders cleaned page content into the tag-request instruction.

use std::fmt::Write as _;

use crate::domain::content::{CleanedContent, ELLIPSIS};
use crate::domain::tag::Tag;

/// Main content is bounded further for prompting to keep token usage down.
const PROMPT_CONTENT_CAP: usize = 500;

/// At most this many headings are quoted in the prompt.
const PROMPT_HEADING_CAP: usize = 3;

/// Build the prompt for a content record and the bookmark's existing tags.
///
/// Pure function: absent fields are omitted entirely, no placeholders. The
/// closing directive pins the output format so the parser has something
/// predictable to work with.
pub fn build_prompt(content: &CleanedContent, existing_tags: &[Tag]) -> String {
    let mut prompt = String::from(
        "Generate 3-5 concise tags for the following website \
         (each tag at most 6 characters, no whitespace):\n\n",
    );

    if !content.title.is_empty() {
        let _ = writeln!(prompt, "Title: {}", content.title);
    }

    if !content.description.is_empty() {
        let _ = writeln!(prompt, "Description: {}", content.description);
    }

    if !content.domain.is_empty() {
        let _ = writeln!(prompt, "Domain: {}", content.domain);
    }

    if !content.content.is_empty() {
        let bounded = if content.content.chars().count() > PROMPT_CONTENT_CAP {
            let mut cut: String = content.content.chars().take(PROMPT_CONTENT_CAP).collect();
            cut.push_str(ELLIPSIS);
            cut
        } else {
            content.content.clone()
        };
        let _ = writeln!(prompt, "Main content: {}", bounded);
    }

    if !content.headings.is_empty() {
        let headings: Vec<&str> = content
            .headings
            .iter()
            .take(PROMPT_HEADING_CAP)
            .map(|h| h.text.as_str())
            .collect();
        let _ = writeln!(prompt, "Key headings: {}", headings.join(", "));
    }

    if existing_tags.is_empty() {
        prompt.push_str("\nSuggest suitable tags for this website.");
    } else {
        let tags: Vec<&str> = existing_tags.iter().map(|t| t.value()).collect();
        let _ = writeln!(prompt, "Existing tags: {}", tags.join(", "));
        prompt.push_str("\nSuggest 3-5 additional tags that complement the existing ones.");
    }

    prompt.push_str(
        "\n\nReturn the tags as \"#tag1 #tag2 #tag3\": space-separated, each prefixed \
         with '#'. Return only the tags, no other text.",
    );

    prompt
}
