//! Ollama-backed summarizer.
//!
//! Sends the aggregated statistics and review sample to a local Ollama
//! instance in a single chat call, requesting strict-JSON output, and parses
//! the narrative draft out of the reply.

use crate::summarizer::{NarrativeDraft, SummarizeError, Summarizer, SummaryRequest};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Configuration for the Ollama summarizer.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_seconds: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            model: "llama3.2:latest".to_string(),
            temperature: 0.1,
            timeout_seconds: 120,
        }
    }
}

/// Chat message in the Ollama API shape.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

const SYSTEM_PROMPT: &str = "You are an expert at analyzing customer reviews and extracting \
actionable insights. Respond with valid JSON only, no explanations or markdown.";

/// Summarizer backed by a local Ollama instance.
pub struct OllamaSummarizer {
    config: OllamaConfig,
    http_client: reqwest::Client,
}

impl OllamaSummarizer {
    pub fn new(config: OllamaConfig) -> Result<Self, SummarizeError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| SummarizeError::Service(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

impl Summarizer for OllamaSummarizer {
    async fn summarize(
        &self,
        request: SummaryRequest<'_>,
    ) -> Result<NarrativeDraft, SummarizeError> {
        let url = format!("{}/api/chat", self.config.url);
        let prompt = build_prompt(&request);
        debug!("Sending summarization request ({} chars)", prompt.len());

        let chat_request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        let response = self
            .http_client
            .post(&url)
            .json(&chat_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SummarizeError::Timeout {
                        seconds: self.config.timeout_seconds,
                    }
                } else if e.is_connect() {
                    SummarizeError::Service(format!("cannot connect to Ollama at {}", self.config.url))
                } else {
                    SummarizeError::Service(format!("failed to send request: {e}"))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Service(format!(
                "Ollama API error {status}: {body}"
            )));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Malformed(format!("unparseable Ollama envelope: {e}")))?;

        parse_draft(&chat_response.message.content)
    }
}

/// Build the user prompt from statistics and the review sample.
fn build_prompt(request: &SummaryRequest<'_>) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "Analyze these customer reviews for \"{}\" and provide insights in JSON format.\n\n",
        request.target_name
    ));

    prompt.push_str("Statistics:\n");
    prompt.push_str(&format!("- Reviews: {}\n", request.stats.count));
    if let Some(avg) = request.stats.average {
        prompt.push_str(&format!("- Average rating: {avg:.1}/5\n"));
    }
    prompt.push_str(&format!(
        "- Sentiment score: {}/100\n",
        request.numeric.sentiment_score
    ));
    prompt.push_str(&format!(
        "- Recommendation rate: {}%\n",
        request.numeric.recommendation_percentage
    ));
    for (dim, avg) in &request.stats.dimensional_averages {
        prompt.push_str(&format!("- {dim}: {avg:.1}/5\n"));
    }
    if !request.numeric.popular_tags.is_empty() {
        let tags: Vec<String> = request
            .numeric
            .popular_tags
            .iter()
            .map(|t| format!("{} ({})", t.tag, t.count))
            .collect();
        prompt.push_str(&format!("- Popular tags: {}\n", tags.join(", ")));
    }

    prompt.push_str("\nRecent reviews:\n");
    for review in request.sample {
        let mut line = format!("Rating: {}/5", review.overall_rating);
        if let Some(ref text) = review.short_review {
            line.push_str(&format!(" - {text}"));
        }
        if !review.tags.is_empty() {
            line.push_str(&format!(" [Tags: {}]", review.tags.join(", ")));
        }
        prompt.push_str(&line);
        prompt.push('\n');
    }

    prompt.push_str(
        r#"
Respond with ONLY valid JSON in this exact format:
{
    "summary": "A 2-3 sentence summary of overall customer sentiment",
    "key_strengths": ["strength1", "strength2", "strength3"],
    "areas_for_improvement": ["area1", "area2"],
    "insights": ["insight1 with percentage", "insight2 with percentage", "insight3"]
}"#,
    );

    prompt
}

/// Parse the narrative draft out of the model's reply.
///
/// Models routinely wrap the JSON in Markdown code fences despite the
/// instructions; strip them before parsing.
fn parse_draft(content: &str) -> Result<NarrativeDraft, SummarizeError> {
    let cleaned = strip_code_fences(content);

    serde_json::from_str(cleaned)
        .map_err(|e| SummarizeError::Malformed(format!("invalid draft JSON: {e}")))
}

/// Strip a surrounding ```/```json fence, if present.
fn strip_code_fences(content: &str) -> &str {
    let mut text = content.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{NumericInsights, RatingStats};
    use crate::models::TagCount;

    fn make_request_parts() -> (RatingStats, NumericInsights) {
        let mut stats = RatingStats::empty();
        stats.count = 3;
        stats.average = Some(4.0);
        stats
            .dimensional_averages
            .insert("taste".to_string(), 4.5);

        let numeric = NumericInsights {
            sentiment_score: 80,
            recommendation_percentage: 33,
            popular_tags: vec![TagCount {
                tag: "fresh".to_string(),
                count: 2,
            }],
        };

        (stats, numeric)
    }

    #[test]
    fn test_build_prompt_contains_statistics() {
        let (stats, numeric) = make_request_parts();
        let request = SummaryRequest {
            target_name: "Butter Chicken",
            stats: &stats,
            numeric: &numeric,
            sample: &[],
        };

        let prompt = build_prompt(&request);
        assert!(prompt.contains("Butter Chicken"));
        assert!(prompt.contains("Average rating: 4.0/5"));
        assert!(prompt.contains("Sentiment score: 80/100"));
        assert!(prompt.contains("Recommendation rate: 33%"));
        assert!(prompt.contains("taste: 4.5/5"));
        assert!(prompt.contains("fresh (2)"));
        assert!(prompt.contains("ONLY valid JSON"));
    }

    #[test]
    fn test_parse_plain_json() {
        let draft = parse_draft(
            r#"{"summary": "Great.", "key_strengths": ["fresh"], "areas_for_improvement": [], "insights": ["80% positive"]}"#,
        )
        .unwrap();

        assert_eq!(draft.summary, "Great.");
        assert_eq!(draft.key_strengths, vec!["fresh"]);
        assert_eq!(draft.insights, vec!["80% positive"]);
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = "```json\n{\"summary\": \"Fenced.\"}\n```";
        let draft = parse_draft(content).unwrap();
        assert_eq!(draft.summary, "Fenced.");
        assert!(draft.insights.is_empty());
    }

    #[test]
    fn test_parse_bare_fence() {
        let content = "```\n{\"summary\": \"Bare.\"}\n```";
        assert_eq!(parse_draft(content).unwrap().summary, "Bare.");
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse_draft("I could not produce JSON, sorry.").unwrap_err();
        assert!(matches!(err, SummarizeError::Malformed(_)));
    }

    #[test]
    fn test_default_config() {
        let config = OllamaConfig::default();
        assert_eq!(config.url, "http://localhost:11434");
        assert_eq!(config.temperature, 0.1);
    }
}
