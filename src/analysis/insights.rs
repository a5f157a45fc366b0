//! Numeric insight derivation.
//!
//! Everything in this module is deterministic and locally computable: the
//! sentiment score, the recommendation percentage, the popular-tag selection,
//! and the review sample handed to the external summarizer. The narrative
//! half of an insight report lives in the `summarizer` module.

use crate::analysis::aggregator::{most_recent, RatingStats};
use crate::analysis::tags::{review_tags, tag_frequency};
use crate::models::{Review, TagCount};
use serde::Serialize;

/// Caps applied to the narrative lists when a draft is accepted.
pub const MAX_INSIGHTS: usize = 5;
pub const MAX_STRENGTHS: usize = 5;
pub const MAX_IMPROVEMENTS: usize = 3;

/// The locally computable half of an insight report.
#[derive(Debug, Clone, Serialize)]
pub struct NumericInsights {
    pub sentiment_score: u8,
    pub recommendation_percentage: u8,
    pub popular_tags: Vec<TagCount>,
}

/// Linear rescale of a 1-5 mean rating to a 0-100 sentiment score.
///
/// Formula: `round(average / 5 * 100)`. An absent average (empty review set)
/// maps to 0. This mapping is presentation-significant and deliberately
/// simple; callers relying on the exact values should treat it as part of the
/// public contract.
pub fn sentiment_score(average: Option<f64>) -> u8 {
    match average {
        Some(avg) => ((avg / 5.0) * 100.0).round().clamp(0.0, 100.0) as u8,
        None => 0,
    }
}

/// Share of reviews whose normalized tag set intersects the recommend-tag
/// allowlist, as an integer percentage with round-half-up. Zero reviews
/// yield 0, not NaN.
pub fn recommendation_percentage(reviews: &[Review], recommend_tags: &[String]) -> u8 {
    if reviews.is_empty() {
        return 0;
    }

    let recommending = reviews
        .iter()
        .filter(|r| {
            review_tags(r)
                .iter()
                .any(|tag| recommend_tags.iter().any(|allowed| allowed == tag))
        })
        .count();

    round_half_up_percent(recommending, reviews.len())
}

/// Round-half-up integer percentage of `part / whole`.
fn round_half_up_percent(part: usize, whole: usize) -> u8 {
    debug_assert!(whole > 0);
    let pct = (part as f64 / whole as f64) * 100.0 + 0.5;
    (pct.floor() as u8).min(100)
}

/// Top-N slice of the full ranked tag table.
pub fn popular_tags(full_table: &[TagCount], top_n: usize) -> Vec<TagCount> {
    full_table.iter().take(top_n).cloned().collect()
}

/// Derive all numeric insight fields from a review set.
pub fn derive_numeric(
    reviews: &[Review],
    stats: &RatingStats,
    recommend_tags: &[String],
    top_tags: usize,
) -> NumericInsights {
    let full_table = tag_frequency(reviews);

    NumericInsights {
        sentiment_score: sentiment_score(stats.average),
        recommendation_percentage: recommendation_percentage(reviews, recommend_tags),
        popular_tags: popular_tags(&full_table, top_tags),
    }
}

/// Select the bounded review sample passed to the summarizer.
///
/// Policy: the `sample_size` most recent reviews by creation timestamp,
/// newest first. Deterministic given the store's ascending ordering.
pub fn summarizer_sample(reviews: &[Review], sample_size: usize) -> Vec<Review> {
    most_recent(reviews, sample_size)
        .into_iter()
        .cloned()
        .collect()
}
