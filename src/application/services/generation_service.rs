// src/application/services/generation_service.rs
use std::fmt::Debug;

use crate::application::error::ApplicationResult;
use crate::domain::bookmark::Bookmark;
use crate::domain::tag::Tag;

/// Terminal state of one tag-generation run.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    /// Tags produced from real page content.
    Generated { tags: Vec<Tag> },
    /// Tags produced on the degraded path, from title and URL only.
    Degraded { tags: Vec<Tag> },
    /// The feature is disabled or unconfigured; nothing was attempted.
    Skipped,
    /// Both the primary and the degraded path came up empty.
    Failed { reason: String },
}

impl GenerationOutcome {
    /// The merged tag set, empty for `Skipped` / `Failed`.
    pub fn tags(&self) -> &[Tag] {
        match self {
            GenerationOutcome::Generated { tags } | GenerationOutcome::Degraded { tags } => tags,
            GenerationOutcome::Skipped | GenerationOutcome::Failed { .. } => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            GenerationOutcome::Generated { .. } | GenerationOutcome::Degraded { .. }
        )
    }
}

/// Service interface for the tag-generation pipeline.
pub trait GenerationService: Send + Sync + Debug {
    /// Run the full pipeline for one bookmark: content (cached or freshly
    /// extracted), prompt, model call, parse, merge, persist — falling back
    /// to title/URL-only generation when page content is unavailable.
    ///
    /// Errors are reserved for persistence failures; everything the
    /// pipeline can degrade around is folded into the outcome.
    fn generate_for_bookmark(&self, bookmark: &Bookmark) -> ApplicationResult<GenerationOutcome>;

    /// Sweep expired entries out of the content cache, returning how many
    /// were dropped.
    fn evict_expired_content(&self) -> usize;
}
