//! Analysis modules.
//!
//! Pure, locally computable statistics over review sets: rating aggregation,
//! tag frequency, and numeric insight derivation.

pub mod aggregator;
pub mod insights;
pub mod tags;

pub use aggregator::{aggregate_ratings, RatingStats};
pub use insights::{derive_numeric, NumericInsights};
pub use tags::tag_frequency;
