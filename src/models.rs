//! Data models for the review analytics engine.
//!
//! This module contains all the core data structures used throughout
//! the application for representing reviews, catalog entities, and the
//! computed aggregate/insight results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of target a review set is aggregated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    /// A catalog item (aggregates reviews across all of its variants).
    Item,
    /// A specific variant of an item (the unit reviews attach to).
    Variant,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Item => write!(f, "item"),
            TargetKind::Variant => write!(f, "variant"),
        }
    }
}

/// Aggregation key: a catalog entity plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Identifier of the item or variant.
    pub id: String,
    /// Whether the id refers to an item or a variant.
    pub kind: TargetKind,
}

impl Target {
    #[allow(dead_code)] // Constructor convenience
    pub fn item(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: TargetKind::Item,
        }
    }

    pub fn variant(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: TargetKind::Variant,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// A single customer review of a variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique review id.
    pub id: String,
    /// Variant the review attaches to.
    pub variant_id: String,
    /// Item the variant belongs to.
    pub item_id: String,
    /// Id of the reviewing user.
    pub user_id: String,
    /// Display name of the reviewing user.
    #[serde(default)]
    pub user_name: String,
    /// Overall star rating in [1, 5], one decimal of precision allowed.
    pub overall_rating: f64,
    /// Optional named sub-ratings (taste, portion, value, ...), each in [1, 5].
    ///
    /// The key vocabulary is open: unknown dimensions are aggregated under
    /// their own bucket rather than rejected.
    #[serde(default)]
    pub dimensional_ratings: BTreeMap<String, f64>,
    /// Short categorical labels attached by the reviewer.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional short review text (<= 160 chars).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_review: Option<String>,
    /// Optional long review text (<= 500 chars).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_review: Option<String>,
    /// Number of helpful votes, monotonically increasing.
    #[serde(default)]
    pub helpful_count: u32,
    /// Whether the review comes from a verified purchase.
    #[serde(default)]
    pub verified: bool,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
}

/// Maximum length of the short review text.
pub const SHORT_REVIEW_MAX: usize = 160;

/// Maximum length of the full review text.
pub const FULL_REVIEW_MAX: usize = 500;

impl Review {
    /// Validate the review invariants.
    ///
    /// Returns a human-readable reason when the review is unusable for
    /// aggregation (out-of-range ratings, oversized texts).
    pub fn validate(&self) -> Result<(), String> {
        if !(1.0..=5.0).contains(&self.overall_rating) {
            return Err(format!(
                "overall_rating {} outside [1, 5]",
                self.overall_rating
            ));
        }
        for (dim, value) in &self.dimensional_ratings {
            if !(1.0..=5.0).contains(value) {
                return Err(format!(
                    "dimension '{}' rating {} outside [1, 5]",
                    dim, value
                ));
            }
        }
        if let Some(ref text) = self.short_review {
            if text.chars().count() > SHORT_REVIEW_MAX {
                return Err(format!("short_review longer than {} chars", SHORT_REVIEW_MAX));
            }
        }
        if let Some(ref text) = self.full_review {
            if text.chars().count() > FULL_REVIEW_MAX {
                return Err(format!("full_review longer than {} chars", FULL_REVIEW_MAX));
            }
        }
        Ok(())
    }
}

/// A reviewable product or service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Price-range label such as "$$" (display only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
}

/// A specific configuration of an item, e.g. "Medium Spice".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub item_id: String,
    pub name: String,
    /// Free-form attribute mapping, e.g. {"spice_level": "medium"}.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

/// A normalized tag with its occurrence count across a review set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// A variant ranked inside an item's trending list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub variant_id: String,
    pub name: String,
    /// Mean overall rating of the variant, absent with no reviews.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    pub review_count: usize,
}

/// Statistical summary of a review set at a point in time.
///
/// Computed fresh from the current review set; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    /// Number of reviews aggregated.
    pub count: usize,
    /// Mean of `overall_rating`, absent when `count == 0`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    /// Mean per dimension, over only the reviews that supplied it.
    pub dimensional_averages: BTreeMap<String, f64>,
    /// Full ranked tag table, descending by count, first-seen tie-break.
    pub tag_frequency: Vec<TagCount>,
    /// Count of reviews per star bucket; index 0 is one star.
    pub rating_distribution: [usize; 5],
    /// Top variants of an item by rating then volume. Empty for variant
    /// targets.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trending: Vec<TrendingEntry>,
}

impl AggregateSnapshot {
    /// The zero-valued snapshot returned for targets with no reviews.
    pub fn empty() -> Self {
        Self {
            count: 0,
            average: None,
            dimensional_averages: BTreeMap::new(),
            tag_frequency: Vec::new(),
            rating_distribution: [0; 5],
            trending: Vec::new(),
        }
    }

    /// Mean rating rounded to one decimal for display.
    pub fn display_average(&self) -> Option<f64> {
        self.average.map(|avg| (avg * 10.0).round() / 10.0)
    }
}

/// Narrative half of an insight report, produced by the summarizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Narrative {
    /// 2-3 sentence summary of overall customer sentiment.
    pub summary: String,
    /// Short observations, at most five.
    pub insights: Vec<String>,
    /// Aspects customers praise, at most five.
    pub key_strengths: Vec<String>,
    /// Aspects customers criticise, at most three.
    pub areas_for_improvement: Vec<String>,
}

/// Why the narrative half of an insight report is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeFailure {
    /// The summarizer did not answer within the configured timeout.
    Timeout,
    /// The summarizer was unreachable or returned an error status.
    ServiceError,
    /// The summarizer answered but the payload could not be parsed.
    MalformedResponse,
    /// The summarizer was deliberately skipped (numeric-only mode).
    Skipped,
}

impl fmt::Display for NarrativeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeFailure::Timeout => write!(f, "summarizer timed out"),
            NarrativeFailure::ServiceError => write!(f, "summarizer unavailable"),
            NarrativeFailure::MalformedResponse => write!(f, "summarizer response malformed"),
            NarrativeFailure::Skipped => write!(f, "summarizer skipped"),
        }
    }
}

/// Combined numeric-plus-narrative summary for a target.
///
/// The numeric fields are always present; the narrative is absent when the
/// external summarizer failed, timed out, or was skipped, with the reason
/// recorded in `narrative_failure`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightReport {
    /// Linear rescale of the mean rating to 0-100; 0 with no reviews.
    pub sentiment_score: u8,
    /// Share of reviews carrying a recommend tag, 0-100 round-half-up.
    pub recommendation_percentage: u8,
    /// Top tags by frequency, truncated at the presentation boundary.
    pub popular_tags: Vec<TagCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative: Option<Narrative>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_failure: Option<NarrativeFailure>,
}

impl InsightReport {
    /// True when the text fields are available.
    #[allow(dead_code)] // Convenience for callers
    pub fn narrative_available(&self) -> bool {
        self.narrative.is_some()
    }
}
