//! ReviewLens - review analytics and LLM-powered insight engine
//!
//! A CLI tool that aggregates customer reviews for a catalog item or
//! variant (averages, dimensional breakdowns, tag frequencies) and asks a
//! local Ollama model for a narrative summary, degrading to numeric-only
//! output when the model is unavailable.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unknown target, unreadable dataset, config, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod report;
mod service;
mod store;
mod summarizer;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::Target;
use report::{Report, ReportMetadata};
use service::InsightService;
use store::{Dataset, ReviewStore};
use summarizer::ollama::OllamaConfig;
use summarizer::OllamaSummarizer;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ReviewLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .reviewlens.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".reviewlens.toml");

    if path.exists() {
        eprintln!("⚠️  .reviewlens.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .reviewlens.toml")?;

    println!("✅ Created .reviewlens.toml with default settings.");
    println!("   Edit it to customize model, recommend tags, sample size, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow.
async fn run_analysis(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let dataset_path = args
        .dataset
        .clone()
        .context("No dataset path provided")?;
    let target = Target {
        id: args.target.clone().context("No target id provided")?,
        kind: args.kind,
    };

    // Step 1: Load the dataset
    println!("📥 Loading dataset: {}", dataset_path.display());
    let dataset = Dataset::load(&dataset_path)?;
    let info = dataset.resolve(&target)?;
    info!("Resolved {} as '{}'", target, info.name);

    // Step 2: Build the service
    if args.numeric_only {
        println!("🔢 Numeric-only mode: the summarizer will not be called.");
    } else {
        println!("🤖 Summarizer: {} at {}", config.model.name, config.model.ollama_url);
        println!("   Timeout: {}s", config.model.timeout_seconds);
    }

    let summarizer = OllamaSummarizer::new(OllamaConfig {
        url: config.model.ollama_url.clone(),
        model: config.model.name.clone(),
        temperature: config.model.temperature,
        timeout_seconds: config.model.timeout_seconds,
    })?;

    let options = config.insight_options(args.numeric_only);
    let service = InsightService::new(dataset, summarizer, options);

    // Step 3: Compute aggregate and insights
    println!("\n🔬 Analyzing reviews for '{}'...", info.name);
    let aggregate = service.get_aggregate(&target)?;
    let insights = service.get_insights(&target).await?;

    // Step 4: Build and save the report
    println!("📝 Generating report...");
    let report = Report {
        metadata: ReportMetadata {
            target: target.clone(),
            target_name: info.name.clone(),
            dataset: dataset_path.display().to_string(),
            generated_at: Utc::now(),
            model_used: if args.numeric_only {
                None
            } else {
                Some(config.model.name.clone())
            },
        },
        aggregate: aggregate.clone(),
        insights: insights.clone(),
    };

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    std::fs::write(&args.output, &output)
        .with_context(|| format!("Failed to write report to {}", args.output.display()))?;

    // Print summary
    println!("\n📊 Summary for '{}':", info.name);
    println!("   Reviews: {}", aggregate.count);
    match aggregate.display_average() {
        Some(avg) => println!("   Average rating: {:.1}/5", avg),
        None => println!("   Average rating: n/a (no reviews)"),
    }
    println!(
        "   Sentiment: {}/100 | Would recommend: {}%",
        insights.sentiment_score, insights.recommendation_percentage
    );
    if let Some(failure) = insights.narrative_failure {
        println!("   Narrative: unavailable ({})", failure);
    } else {
        println!("   Narrative: available");
    }
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        args.output.display()
    );

    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .reviewlens.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
