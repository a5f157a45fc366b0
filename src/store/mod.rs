//! Review store: catalog data and review lookup.
//!
//! The aggregation core only ever reads review data; writes happen in the
//! surrounding application. This module defines the read interface plus a
//! JSON-file-backed implementation used by the CLI.

use crate::models::{Item, Review, Target, TargetKind, Variant};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from target resolution and review lookup.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target id does not resolve to a known item or variant.
    #[error("unknown {kind} '{id}'")]
    UnknownTarget { id: String, kind: TargetKind },
}

/// Resolved target metadata.
#[derive(Debug, Clone)]
pub struct TargetInfo {
    /// Display name of the item or variant.
    pub name: String,
}

/// Read interface over the review corpus.
pub trait ReviewStore {
    /// Resolve a target id to its metadata, or fail with
    /// [`StoreError::UnknownTarget`].
    fn resolve(&self, target: &Target) -> Result<TargetInfo, StoreError>;

    /// All reviews belonging to the target, ordered by creation timestamp
    /// ascending. An unknown target fails; a known target with no reviews
    /// returns an empty list.
    fn list_reviews(&self, target: &Target) -> Result<Vec<Review>, StoreError>;

    /// Variants belonging to an item, in catalog order.
    fn list_variants(&self, item_id: &str) -> Vec<Variant>;
}

/// A full catalog loaded into memory: items, variants, and reviews.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Dataset {
    /// Load a dataset from a JSON file.
    ///
    /// Reviews violating the model invariants are dropped with a warning
    /// rather than failing the whole load.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;

        let mut dataset: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dataset file: {}", path.display()))?;

        dataset.drop_invalid_reviews();
        debug!(
            "Loaded dataset: {} items, {} variants, {} reviews",
            dataset.items.len(),
            dataset.variants.len(),
            dataset.reviews.len()
        );

        Ok(dataset)
    }

    fn drop_invalid_reviews(&mut self) {
        self.reviews.retain(|review| match review.validate() {
            Ok(()) => true,
            Err(reason) => {
                warn!("Dropping invalid review {}: {}", review.id, reason);
                false
            }
        });
    }

    fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }
}

impl ReviewStore for Dataset {
    fn resolve(&self, target: &Target) -> Result<TargetInfo, StoreError> {
        match target.kind {
            TargetKind::Item => self.item(&target.id).map(|item| TargetInfo {
                name: item.name.clone(),
            }),
            TargetKind::Variant => self.variant(&target.id).map(|variant| TargetInfo {
                name: variant.name.clone(),
            }),
        }
        .ok_or_else(|| StoreError::UnknownTarget {
            id: target.id.clone(),
            kind: target.kind,
        })
    }

    fn list_reviews(&self, target: &Target) -> Result<Vec<Review>, StoreError> {
        // Resolve first so an unknown id is an error, not an empty list.
        self.resolve(target)?;

        let mut reviews: Vec<Review> = self
            .reviews
            .iter()
            .filter(|r| match target.kind {
                TargetKind::Item => r.item_id == target.id,
                TargetKind::Variant => r.variant_id == target.id,
            })
            .cloned()
            .collect();

        // Stable sort keeps catalog order for identical timestamps.
        reviews.sort_by_key(|r| r.created_at);

        Ok(reviews)
    }

    fn list_variants(&self, item_id: &str) -> Vec<Variant> {
        self.variants
            .iter()
            .filter(|v| v.item_id == item_id)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use std::io::Write;

    fn make_review(id: &str, variant_id: &str, item_id: &str, rating: f64, day: u32) -> Review {
        Review {
            id: id.to_string(),
            variant_id: variant_id.to_string(),
            item_id: item_id.to_string(),
            user_id: "u1".to_string(),
            user_name: "Test".to_string(),
            overall_rating: rating,
            dimensional_ratings: BTreeMap::new(),
            tags: vec![],
            short_review: None,
            full_review: None,
            helpful_count: 0,
            verified: false,
            created_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
        }
    }

    fn make_dataset() -> Dataset {
        Dataset {
            items: vec![Item {
                id: "i1".to_string(),
                name: "Butter Chicken".to_string(),
                description: None,
                category_id: "c1".to_string(),
                tags: vec![],
                image_url: None,
                price_range: None,
            }],
            variants: vec![
                Variant {
                    id: "v1".to_string(),
                    item_id: "i1".to_string(),
                    name: "Medium Spice".to_string(),
                    attributes: BTreeMap::new(),
                    price: Some(12.5),
                },
                Variant {
                    id: "v2".to_string(),
                    item_id: "i1".to_string(),
                    name: "Extra Hot".to_string(),
                    attributes: BTreeMap::new(),
                    price: Some(13.0),
                },
            ],
            reviews: vec![
                make_review("r2", "v1", "i1", 4.0, 2),
                make_review("r1", "v1", "i1", 5.0, 1),
                make_review("r3", "v2", "i1", 3.0, 3),
            ],
        }
    }

    #[test]
    fn test_resolve_known_targets() {
        let dataset = make_dataset();

        let info = dataset.resolve(&Target::item("i1")).unwrap();
        assert_eq!(info.name, "Butter Chicken");

        let info = dataset.resolve(&Target::variant("v2")).unwrap();
        assert_eq!(info.name, "Extra Hot");
    }

    #[test]
    fn test_resolve_unknown_target() {
        let dataset = make_dataset();
        let err = dataset.resolve(&Target::variant("nope")).unwrap_err();
        assert!(matches!(err, StoreError::UnknownTarget { .. }));
        assert_eq!(err.to_string(), "unknown variant 'nope'");
    }

    #[test]
    fn test_list_reviews_ordered_ascending() {
        let dataset = make_dataset();

        let reviews = dataset.list_reviews(&Target::variant("v1")).unwrap();
        let ids: Vec<&str> = reviews.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["r1", "r2"]);
    }

    #[test]
    fn test_item_reviews_span_variants() {
        let dataset = make_dataset();

        let reviews = dataset.list_reviews(&Target::item("i1")).unwrap();
        assert_eq!(reviews.len(), 3);
    }

    #[test]
    fn test_list_reviews_unknown_target_errors() {
        let dataset = make_dataset();
        assert!(dataset.list_reviews(&Target::item("ghost")).is_err());
    }

    #[test]
    fn test_invalid_reviews_dropped_on_load() {
        let mut dataset = make_dataset();
        dataset.reviews.push(make_review("bad", "v1", "i1", 9.0, 4));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&dataset).unwrap().as_bytes())
            .unwrap();

        let loaded = Dataset::load(file.path()).unwrap();
        assert_eq!(loaded.reviews.len(), 3);
        assert!(loaded.reviews.iter().all(|r| r.id != "bad"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Dataset::load(Path::new("/nonexistent/dataset.json")).is_err());
    }

    #[test]
    fn test_list_variants() {
        let dataset = make_dataset();
        let variants = dataset.list_variants("i1");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].id, "v1");
    }
}
