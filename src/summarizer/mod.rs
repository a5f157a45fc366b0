//! External text-generation collaborator.
//!
//! The summarizer turns aggregated statistics plus a bounded review sample
//! into the narrative half of an insight report. It is an optional
//! collaborator: every failure mode degrades to a numeric-only report at the
//! service layer, never to a hard error.

pub mod ollama;

use crate::analysis::{NumericInsights, RatingStats};
use crate::models::{Narrative, Review};
use serde::Deserialize;
use thiserror::Error;

pub use ollama::OllamaSummarizer;

/// Errors from the external summarizer.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// No answer within the configured deadline.
    #[error("summarization timed out after {seconds}s")]
    Timeout { seconds: u64 },
    /// The collaborator was unreachable or answered with an error.
    #[error("summarization service error: {0}")]
    Service(String),
    /// The collaborator answered but the payload was not usable.
    #[error("malformed summarization response: {0}")]
    Malformed(String),
}

/// Everything the summarizer is given about a target.
///
/// The sample is bounded by the caller; the full review corpus is never sent.
#[derive(Debug, Clone, Copy)]
pub struct SummaryRequest<'a> {
    /// Display name of the item or variant.
    pub target_name: &'a str,
    pub stats: &'a RatingStats,
    pub numeric: &'a NumericInsights,
    /// Most recent reviews, newest first.
    pub sample: &'a [Review],
}

/// Raw narrative payload as produced by the collaborator, before the
/// list caps are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NarrativeDraft {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
}

impl NarrativeDraft {
    /// Accept a draft: truncate each list to its cap.
    pub fn into_narrative(mut self) -> Narrative {
        use crate::analysis::insights::{MAX_IMPROVEMENTS, MAX_INSIGHTS, MAX_STRENGTHS};

        self.insights.truncate(MAX_INSIGHTS);
        self.key_strengths.truncate(MAX_STRENGTHS);
        self.areas_for_improvement.truncate(MAX_IMPROVEMENTS);

        Narrative {
            summary: self.summary,
            insights: self.insights,
            key_strengths: self.key_strengths,
            areas_for_improvement: self.areas_for_improvement,
        }
    }
}

/// Async text-generation collaborator.
#[allow(async_fn_in_trait)]
pub trait Summarizer {
    /// Produce a narrative draft for the given statistics and sample.
    async fn summarize(&self, request: SummaryRequest<'_>) -> Result<NarrativeDraft, SummarizeError>;
}
