//! Tag normalization and frequency counting.
//!
//! Tags arrive as free-form strings from reviewers; this module canonicalizes
//! them (trim, lowercase, hyphen-separated words) and folds them into a ranked
//! frequency table.

use crate::models::{Review, TagCount};
use std::collections::HashMap;

/// Canonicalize a raw tag: trim, lowercase, internal whitespace and
/// underscores collapsed to single hyphens.
///
/// Returns `None` for tags that are empty after normalization.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let normalized = raw
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Normalized, deduplicated tag set of a single review.
pub fn review_tags(review: &Review) -> Vec<String> {
    let mut seen = Vec::new();
    for raw in &review.tags {
        if let Some(tag) = normalize_tag(raw) {
            if !seen.contains(&tag) {
                seen.push(tag);
            }
        }
    }
    seen
}

/// Count tag occurrences across a review set.
///
/// Returns the full ranked table, descending by count. Ties are broken by
/// first-seen order across the input, so callers must pass reviews ordered by
/// creation timestamp ascending for a deterministic ranking. Truncation to a
/// top-N happens at the presentation boundary, never here.
pub fn tag_frequency(reviews: &[Review]) -> Vec<TagCount> {
    // tag -> (first-seen index, count)
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    let mut next_index = 0usize;

    for review in reviews {
        for tag in review_tags(review) {
            let entry = counts.entry(tag).or_insert_with(|| {
                let index = next_index;
                next_index += 1;
                (index, 0)
            });
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(tag, (index, count))| (tag, index, count))
        .collect();

    ranked.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.1.cmp(&b.1)));

    ranked
        .into_iter()
        .map(|(tag, _, count)| TagCount { tag, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn make_review(id: &str, tags: &[&str]) -> Review {
        Review {
            id: id.to_string(),
            variant_id: "v1".to_string(),
            item_id: "i1".to_string(),
            user_id: "u1".to_string(),
            user_name: "Test".to_string(),
            overall_rating: 4.0,
            dimensional_ratings: BTreeMap::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            short_review: None,
            full_review: None,
            helpful_count: 0,
            verified: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("  Fresh  "), Some("fresh".to_string()));
        assert_eq!(
            normalize_tag("Would Recommend"),
            Some("would-recommend".to_string())
        );
        assert_eq!(
            normalize_tag("worth_price"),
            Some("worth-price".to_string())
        );
        assert_eq!(normalize_tag("Would-Recommend"), Some("would-recommend".to_string()));
        assert_eq!(normalize_tag("   "), None);
        assert_eq!(normalize_tag(""), None);
    }

    #[test]
    fn test_review_tags_deduplicates() {
        let review = make_review("r1", &["Fresh", "fresh ", "FRESH", "spicy"]);
        assert_eq!(review_tags(&review), vec!["fresh", "spicy"]);
    }

    #[test]
    fn test_frequency_ranking() {
        let reviews = vec![
            make_review("r1", &["fresh", "would-recommend"]),
            make_review("r2", &["fresh"]),
            make_review("r3", &[]),
        ];

        let table = tag_frequency(&reviews);
        assert_eq!(
            table,
            vec![
                TagCount {
                    tag: "fresh".to_string(),
                    count: 2
                },
                TagCount {
                    tag: "would-recommend".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn test_counts_sum_to_tag_pairs() {
        let reviews = vec![
            make_review("r1", &["fresh", "spicy", "authentic"]),
            make_review("r2", &["fresh", "spicy"]),
            make_review("r3", &["fresh"]),
        ];

        let table = tag_frequency(&reviews);
        let total: usize = table.iter().map(|t| t.count).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_tie_broken_by_first_seen() {
        // "spicy" and "authentic" both appear once; "spicy" was seen first.
        let reviews = vec![
            make_review("r1", &["spicy"]),
            make_review("r2", &["authentic"]),
        ];

        let table = tag_frequency(&reviews);
        assert_eq!(table[0].tag, "spicy");
        assert_eq!(table[1].tag, "authentic");
    }

    #[test]
    fn test_full_table_returned() {
        let tags: Vec<String> = (0..12).map(|i| format!("tag-{i}")).collect();
        let tag_refs: Vec<&str> = tags.iter().map(String::as_str).collect();
        let reviews = vec![make_review("r1", &tag_refs)];

        // No internal truncation.
        assert_eq!(tag_frequency(&reviews).len(), 12);
    }
}
