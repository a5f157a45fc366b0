//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.reviewlens.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Summarizer model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Insight derivation settings.
    #[serde(default)]
    pub insights: InsightsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "reviewlens_report.md".to_string()
}

/// LLM summarizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Summarization call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    120
}

/// Insight derivation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsConfig {
    /// How many recent reviews are sent to the summarizer.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// How many tags survive into the popular-tags list.
    #[serde(default = "default_top_tags")]
    pub top_tags: usize,

    /// Normalized tags counted as a recommend signal.
    #[serde(default = "default_recommend_tags")]
    pub recommend_tags: Vec<String>,

    /// How many variants appear in an item's trending list.
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
            top_tags: default_top_tags(),
            recommend_tags: default_recommend_tags(),
            trending_limit: default_trending_limit(),
        }
    }
}

fn default_sample_size() -> usize {
    20
}

fn default_top_tags() -> usize {
    8
}

fn default_recommend_tags() -> Vec<String> {
    vec!["would-recommend".to_string()]
}

fn default_trending_limit() -> usize {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but
    /// can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".reviewlens.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.ollama_url = args.ollama_url.clone();
        self.model.temperature = args.temperature;

        // Optional settings - only override if provided
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
        if let Some(sample_size) = args.sample_size {
            self.insights.sample_size = sample_size;
        }
        if let Some(top_tags) = args.top_tags {
            self.insights.top_tags = top_tags;
        }
        if let Some(ref recommend_tags) = args.recommend_tags {
            self.insights.recommend_tags = recommend_tags.clone();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Build the service tunables from the merged configuration.
    pub fn insight_options(&self, numeric_only: bool) -> crate::service::InsightOptions {
        crate::service::InsightOptions {
            recommend_tags: self.insights.recommend_tags.clone(),
            top_tags: self.insights.top_tags,
            sample_size: self.insights.sample_size,
            trending_limit: self.insights.trending_limit,
            timeout: Duration::from_secs(self.model.timeout_seconds),
            skip_narrative: numeric_only,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
