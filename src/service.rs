//! Insight service facade.
//!
//! Exposes the two read operations consumed by the surrounding application:
//! `get_aggregate` and `get_insights`. Each call is stateless over a review
//! snapshot fetched at call start; the only blocking collaborator is the
//! external summarizer, which is bounded by a per-call timeout and never
//! prevents the numeric results from being returned.

use crate::analysis::insights::{derive_numeric, summarizer_sample};
use crate::analysis::{aggregate_ratings, tag_frequency};
use crate::models::{
    AggregateSnapshot, InsightReport, NarrativeFailure, Target, TargetKind, TrendingEntry,
};
use crate::store::{ReviewStore, StoreError};
use crate::summarizer::{SummarizeError, Summarizer, SummaryRequest};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

/// Tunables for insight derivation.
#[derive(Debug, Clone)]
pub struct InsightOptions {
    /// Normalized tags that count as a recommend signal.
    pub recommend_tags: Vec<String>,
    /// How many tags survive into `popular_tags`.
    pub top_tags: usize,
    /// How many recent reviews are sent to the summarizer.
    pub sample_size: usize,
    /// How many variants appear in an item's trending list.
    pub trending_limit: usize,
    /// Deadline for the external summarization call.
    pub timeout: Duration,
    /// Skip the summarizer entirely (numeric-only mode).
    pub skip_narrative: bool,
}

impl Default for InsightOptions {
    fn default() -> Self {
        Self {
            recommend_tags: vec!["would-recommend".to_string()],
            top_tags: 8,
            sample_size: 20,
            trending_limit: 5,
            timeout: Duration::from_secs(120),
            skip_narrative: false,
        }
    }
}

/// Aggregation and insight service over a review store.
///
/// Snapshots are cached per `(target id, kind)` and invalidated whenever the
/// submission path reports a new review for that target, so a cached read
/// never outlives the review set it was computed from.
pub struct InsightService<S, G> {
    store: S,
    summarizer: G,
    options: InsightOptions,
    cache: RwLock<HashMap<(String, TargetKind), AggregateSnapshot>>,
}

impl<S, G> InsightService<S, G>
where
    S: ReviewStore,
    G: Summarizer,
{
    pub fn new(store: S, summarizer: G, options: InsightOptions) -> Self {
        Self {
            store,
            summarizer,
            options,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drop the cached snapshot for a target.
    ///
    /// The review-submission path must call this whenever a new review
    /// referencing the target is accepted; the next read recomputes lazily.
    #[allow(dead_code)] // Hook for the review-submission path
    pub fn invalidate(&self, target: &Target) {
        let mut cache = self.cache.write().expect("snapshot cache poisoned");
        cache.remove(&(target.id.clone(), target.kind));
    }

    /// Compute the aggregate snapshot for a target.
    ///
    /// Never fails for a valid id; a target with no reviews yields the
    /// zero-valued snapshot.
    pub fn get_aggregate(&self, target: &Target) -> Result<AggregateSnapshot, StoreError> {
        let key = (target.id.clone(), target.kind);
        {
            let cache = self.cache.read().expect("snapshot cache poisoned");
            if let Some(snapshot) = cache.get(&key) {
                debug!("Snapshot cache hit for {}", target);
                return Ok(snapshot.clone());
            }
        }

        let snapshot = self.compute_aggregate(target)?;

        let mut cache = self.cache.write().expect("snapshot cache poisoned");
        cache.insert(key, snapshot.clone());
        Ok(snapshot)
    }

    fn compute_aggregate(&self, target: &Target) -> Result<AggregateSnapshot, StoreError> {
        let reviews = self.store.list_reviews(target)?;
        if reviews.is_empty() {
            return Ok(AggregateSnapshot::empty());
        }

        let stats = aggregate_ratings(&reviews);
        let frequency = tag_frequency(&reviews);

        let trending = match target.kind {
            TargetKind::Item => self.trending_variants(&target.id),
            TargetKind::Variant => Vec::new(),
        };

        Ok(AggregateSnapshot {
            count: stats.count,
            average: stats.average,
            dimensional_averages: stats.dimensional_averages,
            tag_frequency: frequency,
            rating_distribution: stats.rating_distribution,
            trending,
        })
    }

    /// Rank an item's variants by mean rating, then review volume.
    fn trending_variants(&self, item_id: &str) -> Vec<TrendingEntry> {
        let mut entries: Vec<TrendingEntry> = self
            .store
            .list_variants(item_id)
            .into_iter()
            .filter_map(|variant| {
                let reviews = self
                    .store
                    .list_reviews(&Target::variant(variant.id.clone()))
                    .ok()?;
                let stats = aggregate_ratings(&reviews);
                Some(TrendingEntry {
                    variant_id: variant.id,
                    name: variant.name,
                    average: stats.average,
                    review_count: stats.count,
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            let a_avg = a.average.unwrap_or(0.0);
            let b_avg = b.average.unwrap_or(0.0);
            b_avg
                .partial_cmp(&a_avg)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.review_count.cmp(&a.review_count))
        });
        entries.truncate(self.options.trending_limit);
        entries
    }

    /// Compute the insight report for a target.
    ///
    /// The numeric fields are derived locally before the summarizer is
    /// consulted; the narrative call runs under the configured timeout and
    /// degrades to an unavailability marker on any failure, so it can never
    /// fail the numeric results.
    pub async fn get_insights(&self, target: &Target) -> Result<InsightReport, StoreError> {
        let info = self.store.resolve(target)?;
        let reviews = self.store.list_reviews(target)?;
        let stats = aggregate_ratings(&reviews);

        let numeric = derive_numeric(
            &reviews,
            &stats,
            &self.options.recommend_tags,
            self.options.top_tags,
        );

        if self.options.skip_narrative || reviews.is_empty() {
            return Ok(InsightReport {
                sentiment_score: numeric.sentiment_score,
                recommendation_percentage: numeric.recommendation_percentage,
                popular_tags: numeric.popular_tags,
                narrative: None,
                narrative_failure: Some(NarrativeFailure::Skipped),
            });
        }

        // The summarizer needs the numeric statistics in its prompt, so they
        // are derived up front; the narrative call then runs to completion
        // (or deadline) without ever being able to fail the numeric half.
        let sample = summarizer_sample(&reviews, self.options.sample_size);
        let request = SummaryRequest {
            target_name: &info.name,
            stats: &stats,
            numeric: &numeric,
            sample: &sample,
        };

        let outcome = tokio::time::timeout(self.options.timeout, async {
            self.summarizer.summarize(request).await
        })
        .await;

        let (narrative, narrative_failure) = match outcome {
            Ok(Ok(draft)) => (Some(draft.into_narrative()), None),
            Ok(Err(err)) => {
                warn!("Summarization failed for {}: {}", target, err);
                (None, Some(classify_failure(&err)))
            }
            Err(_elapsed) => {
                warn!(
                    "Summarization timed out after {:?} for {}",
                    self.options.timeout, target
                );
                (None, Some(NarrativeFailure::Timeout))
            }
        };

        Ok(InsightReport {
            sentiment_score: numeric.sentiment_score,
            recommendation_percentage: numeric.recommendation_percentage,
            popular_tags: numeric.popular_tags,
            narrative,
            narrative_failure,
        })
    }
}

fn classify_failure(err: &SummarizeError) -> NarrativeFailure {
    match err {
        SummarizeError::Timeout { .. } => NarrativeFailure::Timeout,
        SummarizeError::Service(_) => NarrativeFailure::ServiceError,
        SummarizeError::Malformed(_) => NarrativeFailure::MalformedResponse,
    }
}
