//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::TargetKind;
use clap::Parser;
use std::path::PathBuf;

/// ReviewLens - review analytics and LLM-powered insight engine
///
/// Aggregate star ratings, dimensional breakdowns, and tag frequencies for a
/// catalog item or variant, and optionally ask a local LLM for a narrative
/// summary. Markdown/JSON reports. Built in Rust.
///
/// Examples:
///   reviewlens --dataset reviews.json --target v-42 --kind variant
///   reviewlens --dataset reviews.json --target i-7 --kind item --format json
///   reviewlens --dataset reviews.json --target i-7 --numeric-only
///   reviewlens --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the JSON dataset (items, variants, reviews)
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "init_config"
    )]
    pub dataset: Option<PathBuf>,

    /// Id of the item or variant to analyze
    #[arg(
        short,
        long,
        value_name = "ID",
        required_unless_present = "init_config"
    )]
    pub target: Option<String>,

    /// Whether the target id is an item or a variant
    #[arg(short, long, value_enum, default_value_t = TargetKind::Item)]
    pub kind: TargetKind,

    /// Ollama model to use for the narrative summary
    ///
    /// Can also be set via REVIEWLENS_MODEL env var or .reviewlens.toml.
    #[arg(
        short,
        long,
        default_value = "llama3.2:latest",
        env = "REVIEWLENS_MODEL"
    )]
    pub model: String,

    /// Output file path for the report
    #[arg(
        short,
        long,
        default_value = "reviewlens_report.md",
        value_name = "FILE"
    )]
    pub output: PathBuf,

    /// Ollama API endpoint URL
    #[arg(long, default_value = "http://localhost:11434", env = "OLLAMA_URL")]
    pub ollama_url: String,

    /// Path to configuration file
    ///
    /// If not specified, looks for .reviewlens.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Temperature for LLM responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.1")]
    pub temperature: f32,

    /// Summarization timeout in seconds
    ///
    /// How long to wait for the LLM before falling back to a numeric-only
    /// report. Default: from config or 120s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of recent reviews sent to the summarizer
    #[arg(long, value_name = "COUNT")]
    pub sample_size: Option<usize>,

    /// Number of tags shown in the popular-tags list
    #[arg(long, value_name = "COUNT")]
    pub top_tags: Option<usize>,

    /// Tags counted as a recommend signal (comma-separated)
    ///
    /// Example: --recommend-tags would-recommend,recommended
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub recommend_tags: Option<Vec<String>>,

    /// Skip the LLM entirely and report numeric results only
    #[arg(long)]
    pub numeric_only: bool,

    /// Generate a default .reviewlens.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate Ollama URL format (not needed for numeric-only runs)
        if !self.numeric_only
            && !self.ollama_url.starts_with("http://")
            && !self.ollama_url.starts_with("https://")
        {
            return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(sample_size) = self.sample_size {
            if sample_size == 0 {
                return Err("Sample size must be at least 1".to_string());
            }
        }

        if let Some(top_tags) = self.top_tags {
            if top_tags == 0 {
                return Err("Top tags must be at least 1".to_string());
            }
        }

        // Validate dataset path if provided
        if let Some(ref dataset) = self.dataset {
            if !dataset.exists() {
                return Err(format!("Dataset file does not exist: {}", dataset.display()));
            }
            if !dataset.is_file() {
                return Err(format!("Dataset path is not a file: {}", dataset.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
