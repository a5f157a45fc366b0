//! Markdown report generation.
//!
//! This module renders the aggregate snapshot and insight report for a
//! target into a Markdown document, or serializes the whole bundle as JSON.

use crate::models::{AggregateSnapshot, InsightReport, Target};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata about the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Target the report was computed for.
    pub target: Target,
    /// Display name of the target.
    pub target_name: String,
    /// Dataset file the reviews came from.
    pub dataset: String,
    /// Date and time of the analysis.
    pub generated_at: DateTime<Utc>,
    /// Name of the LLM model used, absent for numeric-only runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

/// The complete report bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub aggregate: AggregateSnapshot,
    pub insights: InsightReport,
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# ReviewLens Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_rating_section(&report.aggregate, &report.insights));
    output.push_str(&generate_dimensions_section(&report.aggregate));
    output.push_str(&generate_tags_section(&report.insights));
    output.push_str(&generate_trending_section(&report.aggregate));
    output.push_str(&generate_narrative_section(&report.insights));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Target:** {} (`{}`)\n",
        metadata.target_name, metadata.target
    ));
    section.push_str(&format!("- **Dataset:** {}\n", metadata.dataset));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(ref model) = metadata.model_used {
        section.push_str(&format!("- **Model Used:** `{}`\n", model));
    } else {
        section.push_str("- **Model Used:** none (numeric-only run)\n");
    }
    section.push('\n');

    section
}

/// Generate the rating summary section.
fn generate_rating_section(aggregate: &AggregateSnapshot, insights: &InsightReport) -> String {
    let mut section = String::new();

    section.push_str("## Rating Summary\n\n");

    let average = aggregate
        .display_average()
        .map(|avg| format!("{avg:.1}"))
        .unwrap_or_else(|| "n/a".to_string());

    section.push_str("| Reviews | Average | Sentiment | Would Recommend |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {}/100 | {}% |\n\n",
        aggregate.count, average, insights.sentiment_score, insights.recommendation_percentage
    ));

    if aggregate.count > 0 {
        section.push_str("### Rating Distribution\n\n");
        section.push_str("| Stars | Reviews |\n");
        section.push_str("|:---:|:---:|\n");
        for stars in (1..=5).rev() {
            section.push_str(&format!(
                "| {} | {} |\n",
                "★".repeat(stars),
                aggregate.rating_distribution[stars - 1]
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the dimensional breakdown section.
fn generate_dimensions_section(aggregate: &AggregateSnapshot) -> String {
    if aggregate.dimensional_averages.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Dimensional Breakdown\n\n");
    section.push_str("| Dimension | Average |\n");
    section.push_str("|:---|:---:|\n");
    for (dim, avg) in &aggregate.dimensional_averages {
        section.push_str(&format!("| {} | {:.1} |\n", dim, avg));
    }
    section.push('\n');

    section
}

/// Generate the popular tags section.
fn generate_tags_section(insights: &InsightReport) -> String {
    if insights.popular_tags.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Popular Tags\n\n");
    section.push_str("| Tag | Mentions |\n");
    section.push_str("|:---|:---:|\n");
    for tag in &insights.popular_tags {
        section.push_str(&format!("| {} | {} |\n", tag.tag, tag.count));
    }
    section.push('\n');

    section
}

/// Generate the trending variants section (item targets only).
fn generate_trending_section(aggregate: &AggregateSnapshot) -> String {
    if aggregate.trending.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Top Variants\n\n");
    section.push_str("| Variant | Average | Reviews |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for entry in &aggregate.trending {
        let average = entry
            .average
            .map(|avg| format!("{:.1}", (avg * 10.0).round() / 10.0))
            .unwrap_or_else(|| "n/a".to_string());
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            entry.name, average, entry.review_count
        ));
    }
    section.push('\n');

    section
}

/// Generate the narrative insights section.
fn generate_narrative_section(insights: &InsightReport) -> String {
    let mut section = String::new();

    section.push_str("## Insights\n\n");

    let Some(ref narrative) = insights.narrative else {
        let reason = insights
            .narrative_failure
            .map(|f| f.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        section.push_str(&format!(
            "_Narrative insights unavailable ({}). Numeric results above are unaffected._\n\n",
            reason
        ));
        return section;
    };

    section.push_str(&narrative.summary);
    section.push_str("\n\n");

    if !narrative.insights.is_empty() {
        section.push_str("### Observations\n\n");
        for insight in &narrative.insights {
            section.push_str(&format!("- {}\n", insight));
        }
        section.push('\n');
    }

    if !narrative.key_strengths.is_empty() {
        section.push_str("### Key Strengths\n\n");
        for strength in &narrative.key_strengths {
            section.push_str(&format!("- {}\n", strength));
        }
        section.push('\n');
    }

    if !narrative.areas_for_improvement.is_empty() {
        section.push_str("### Areas for Improvement\n\n");
        for area in &narrative.areas_for_improvement {
            section.push_str(&format!("- {}\n", area));
        }
        section.push('\n');
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by ReviewLens*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Narrative, NarrativeFailure, TagCount, TrendingEntry};

    fn create_test_report() -> Report {
        let mut aggregate = AggregateSnapshot::empty();
        aggregate.count = 3;
        aggregate.average = Some(4.0);
        aggregate
            .dimensional_averages
            .insert("taste".to_string(), 4.5);
        aggregate.tag_frequency = vec![TagCount {
            tag: "fresh".to_string(),
            count: 2,
        }];
        aggregate.rating_distribution = [0, 0, 1, 1, 1];
        aggregate.trending = vec![TrendingEntry {
            variant_id: "v1".to_string(),
            name: "Medium Spice".to_string(),
            average: Some(4.0),
            review_count: 3,
        }];

        Report {
            metadata: ReportMetadata {
                target: Target::item("i1"),
                target_name: "Butter Chicken".to_string(),
                dataset: "reviews.json".to_string(),
                generated_at: Utc::now(),
                model_used: Some("llama3.2:latest".to_string()),
            },
            aggregate,
            insights: InsightReport {
                sentiment_score: 80,
                recommendation_percentage: 33,
                popular_tags: vec![TagCount {
                    tag: "fresh".to_string(),
                    count: 2,
                }],
                narrative: Some(Narrative {
                    summary: "Customers are happy.".to_string(),
                    insights: vec!["67% mention freshness".to_string()],
                    key_strengths: vec!["fresh".to_string()],
                    areas_for_improvement: vec!["portion size".to_string()],
                }),
                narrative_failure: None,
            },
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# ReviewLens Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("Butter Chicken"));
        assert!(markdown.contains("| 3 | 4.0 | 80/100 | 33% |"));
        assert!(markdown.contains("## Dimensional Breakdown"));
        assert!(markdown.contains("| taste | 4.5 |"));
        assert!(markdown.contains("## Popular Tags"));
        assert!(markdown.contains("## Top Variants"));
        assert!(markdown.contains("Customers are happy."));
        assert!(markdown.contains("### Areas for Improvement"));
    }

    #[test]
    fn test_markdown_with_unavailable_narrative() {
        let mut report = create_test_report();
        report.insights.narrative = None;
        report.insights.narrative_failure = Some(NarrativeFailure::Timeout);

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("Narrative insights unavailable (summarizer timed out)"));
        // Numeric results are still rendered.
        assert!(markdown.contains("80/100"));
    }

    #[test]
    fn test_markdown_empty_review_set() {
        let mut report = create_test_report();
        report.aggregate = AggregateSnapshot::empty();
        report.insights.sentiment_score = 0;
        report.insights.recommendation_percentage = 0;
        report.insights.popular_tags.clear();

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("| 0 | n/a | 0/100 | 0% |"));
        assert!(!markdown.contains("### Rating Distribution"));
        assert!(!markdown.contains("## Popular Tags"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"target_name\""));
        assert!(json.contains("\"aggregate\""));
        assert!(json.contains("\"sentiment_score\""));
    }
}
