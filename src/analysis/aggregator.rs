//! Rating aggregation and statistics.
//!
//! This module folds raw review records into summary statistics: review
//! count, overall average, per-dimension averages, and the star-rating
//! histogram. All functions are pure over the review slice they receive.

use crate::models::Review;
use std::collections::BTreeMap;

/// Core numeric aggregate of a review set.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingStats {
    /// Number of reviews folded in.
    pub count: usize,
    /// Arithmetic mean of `overall_rating`; `None` when `count == 0`.
    pub average: Option<f64>,
    /// Mean per dimension, over only the reviews that supplied it.
    ///
    /// A dimension never reported by any review is absent from the map;
    /// a dimension reported once averages to that single value.
    pub dimensional_averages: BTreeMap<String, f64>,
    /// Count of reviews per star bucket; index 0 is one star.
    pub rating_distribution: [usize; 5],
}

impl RatingStats {
    /// The zero-valued stats for an empty review set.
    pub fn empty() -> Self {
        Self {
            count: 0,
            average: None,
            dimensional_averages: BTreeMap::new(),
            rating_distribution: [0; 5],
        }
    }
}

/// Aggregate a review set into [`RatingStats`].
///
/// Reviews omitting a dimension are excluded from that dimension's
/// denominator rather than treated as zero.
pub fn aggregate_ratings(reviews: &[Review]) -> RatingStats {
    if reviews.is_empty() {
        return RatingStats::empty();
    }

    let mut rating_sum = 0.0;
    let mut dim_totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut dim_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut distribution = [0usize; 5];

    for review in reviews {
        rating_sum += review.overall_rating;

        // Half-stars and decimals land in the nearest whole-star bucket.
        let bucket = (review.overall_rating.round() as usize).clamp(1, 5);
        distribution[bucket - 1] += 1;

        for (dim, value) in &review.dimensional_ratings {
            *dim_totals.entry(dim.clone()).or_default() += value;
            *dim_counts.entry(dim.clone()).or_default() += 1;
        }
    }

    let dimensional_averages = dim_totals
        .into_iter()
        .map(|(dim, total)| {
            let count = dim_counts[&dim];
            (dim, total / count as f64)
        })
        .collect();

    RatingStats {
        count: reviews.len(),
        average: Some(rating_sum / reviews.len() as f64),
        dimensional_averages,
        rating_distribution: distribution,
    }
}

/// Filter a review set down to reviews at or above a minimum rating.
#[allow(dead_code)] // Utility for filtered review listings
pub fn filter_by_min_rating(reviews: &[Review], min_rating: f64) -> Vec<Review> {
    reviews
        .iter()
        .filter(|r| r.overall_rating >= min_rating)
        .cloned()
        .collect()
}

/// The `n` most recent reviews, newest first.
///
/// Expects the input ordered by creation timestamp ascending, which is the
/// review store's contract; the result is then deterministic.
pub fn most_recent<'a>(reviews: &'a [Review], n: usize) -> Vec<&'a Review> {
    reviews.iter().rev().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn make_review(id: &str, rating: f64, dims: &[(&str, f64)]) -> Review {
        Review {
            id: id.to_string(),
            variant_id: "v1".to_string(),
            item_id: "i1".to_string(),
            user_id: "u1".to_string(),
            user_name: "Test".to_string(),
            overall_rating: rating,
            dimensional_ratings: dims
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            tags: vec![],
            short_review: None,
            full_review: None,
            helpful_count: 0,
            verified: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_review_set() {
        let stats = aggregate_ratings(&[]);
        assert_eq!(stats.count, 0);
        assert!(stats.average.is_none());
        assert!(stats.dimensional_averages.is_empty());
        assert_eq!(stats.rating_distribution, [0; 5]);
    }

    #[test]
    fn test_overall_average() {
        let reviews = vec![
            make_review("r1", 5.0, &[]),
            make_review("r2", 4.0, &[]),
            make_review("r3", 3.0, &[]),
        ];

        let stats = aggregate_ratings(&reviews);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.average, Some(4.0));
    }

    #[test]
    fn test_average_is_order_independent() {
        let mut reviews = vec![
            make_review("r1", 2.0, &[]),
            make_review("r2", 4.5, &[]),
            make_review("r3", 3.5, &[]),
        ];

        let forward = aggregate_ratings(&reviews);
        reviews.reverse();
        let backward = aggregate_ratings(&reviews);

        assert_eq!(forward.average, backward.average);
    }

    #[test]
    fn test_dimensional_denominators() {
        // portion is reported by only one review: its denominator is 1.
        let reviews = vec![
            make_review("r1", 5.0, &[("taste", 5.0)]),
            make_review("r2", 3.0, &[("taste", 3.0), ("portion", 4.0)]),
        ];

        let stats = aggregate_ratings(&reviews);
        assert_eq!(stats.dimensional_averages.get("taste"), Some(&4.0));
        assert_eq!(stats.dimensional_averages.get("portion"), Some(&4.0));
    }

    #[test]
    fn test_unreported_dimension_absent() {
        let reviews = vec![make_review("r1", 4.0, &[("taste", 4.0)])];

        let stats = aggregate_ratings(&reviews);
        assert!(!stats.dimensional_averages.contains_key("freshness"));
        assert_eq!(stats.dimensional_averages.len(), 1);
    }

    #[test]
    fn test_rating_distribution() {
        let reviews = vec![
            make_review("r1", 5.0, &[]),
            make_review("r2", 5.0, &[]),
            make_review("r3", 4.4, &[]), // rounds to 4 stars
            make_review("r4", 1.0, &[]),
        ];

        let stats = aggregate_ratings(&reviews);
        assert_eq!(stats.rating_distribution, [1, 0, 0, 1, 2]);
    }

    #[test]
    fn test_filter_by_min_rating() {
        let reviews = vec![
            make_review("r1", 5.0, &[]),
            make_review("r2", 2.0, &[]),
            make_review("r3", 4.0, &[]),
        ];

        let filtered = filter_by_min_rating(&reviews, 4.0);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.overall_rating >= 4.0));
    }

    #[test]
    fn test_most_recent() {
        let mut reviews = Vec::new();
        for day in 1..=5 {
            let mut r = make_review(&format!("r{day}"), 4.0, &[]);
            r.created_at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
            reviews.push(r);
        }

        let recent = most_recent(&reviews, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "r5");
        assert_eq!(recent[1].id, "r4");
    }
}
