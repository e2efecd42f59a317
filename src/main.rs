//! MCP Bench CLI
//!
//! Replays dialogues against a candidate and a baseline system and reports
//! semantic, single-judgment and pairwise-judgment results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mcp_bench::{
    config::Config,
    dataset::{DialogueDataset, create_sample_dataset},
    llm::LlmClient,
    orchestrator::Orchestrator,
    persistence::load_results,
    scoring::{LexicalOverlapScorer, SemanticScorer},
};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// MCP Bench - compare two dialogue systems turn by turn
#[derive(Parser)]
#[command(name = "mcp-bench")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark
    Run {
        /// Dataset file or directory (built-in sample dataset if omitted)
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Number of sessions to replay
        #[arg(short, long)]
        n_samples: Option<usize>,

        /// Seed for the pairwise presentation order
        #[arg(long)]
        seed: Option<u64>,

        /// Output path for the results file (timestamped name if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Score semantic similarity with a local embedding model
        #[cfg(feature = "embeddings")]
        #[arg(long)]
        embeddings: bool,
    },

    /// Print the summary of a saved results file
    Show {
        /// Path to the results file
        path: PathBuf,

        /// Print the raw document instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        #[cfg(feature = "embeddings")]
        Commands::Run {
            dataset,
            n_samples,
            seed,
            output,
            embeddings,
        } => cmd_run(dataset, n_samples, seed, output, embeddings).await,
        #[cfg(not(feature = "embeddings"))]
        Commands::Run {
            dataset,
            n_samples,
            seed,
            output,
        } => cmd_run(dataset, n_samples, seed, output, false).await,
        Commands::Show { path, json } => cmd_show(path, json),
        Commands::Test => cmd_test().await,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(feature = "embeddings")]
fn semantic_scorer(embeddings: bool) -> Result<Box<dyn SemanticScorer>> {
    if embeddings {
        println!("Loading embedding model...");
        let scorer = mcp_bench::scoring::EmbeddingScorer::load_minilm()
            .context("Failed to load embedding model")?;
        return Ok(Box::new(scorer));
    }
    Ok(Box::new(LexicalOverlapScorer::new()))
}

#[cfg(not(feature = "embeddings"))]
fn semantic_scorer(_embeddings: bool) -> Result<Box<dyn SemanticScorer>> {
    Ok(Box::new(LexicalOverlapScorer::new()))
}

async fn cmd_run(
    dataset_path: Option<PathBuf>,
    n_samples: Option<usize>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    embeddings: bool,
) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(n) = n_samples {
        config.bench.n_samples = n;
    }
    if seed.is_some() {
        config.bench.seed = seed;
    }
    if dataset_path.is_some() {
        config.bench.dataset = dataset_path;
    }
    config.validate().context("Invalid configuration")?;

    let dataset = match &config.bench.dataset {
        Some(path) => {
            println!("Loading dataset from {}...", path.display());
            DialogueDataset::with_samples(path, config.bench.n_samples)
                .context("Failed to load dataset")?
        }
        None => {
            println!("Using sample dataset...");
            create_sample_dataset().take(config.bench.n_samples)
        }
    };

    println!("Dataset: {} ({} sessions)", dataset.name, dataset.len());
    println!("Using model: {}", config.llm.model);

    let semantic = semantic_scorer(embeddings)?;
    let mut orchestrator = Orchestrator::from_config(&config, dataset, semantic);

    let start = Instant::now();
    println!("\nStarting MCP metrics calculation...");
    orchestrator.calculate().await.context("Benchmark failed")?;

    println!("Calculation completed in {:.1?}. Results:", start.elapsed());
    orchestrator.print_summary().await?;

    let saved_path = orchestrator
        .save(output.as_deref())
        .await
        .context("Failed to save results")?;
    println!("\nResults have been saved to: {}", saved_path.display());

    Ok(())
}

fn cmd_show(path: PathBuf, json: bool) -> Result<()> {
    let report = load_results(&path)
        .with_context(|| format!("Failed to load results from '{}'", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Results from {}", path.display());
        println!("  Generated:  {}", report.metadata.timestamp);
        println!("  Samples:    {}", report.metadata.n_samples);
        report.print_summary();
    }

    Ok(())
}

async fn cmd_test() -> Result<()> {
    println!("Testing LLM connection...\n");

    let config = Config::load().context("Failed to load configuration")?;

    let key_preview: String = config.llm.api_key.chars().take(8).collect();
    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    println!("  API Key:   {}...", key_preview);
    println!();

    config.validate().context("Invalid configuration")?;

    let client = LlmClient::new(config.llm);

    println!("Sending test request...");
    client
        .test_connection()
        .await
        .context("Connection failed")?;
    println!("Connection successful!");

    Ok(())
}
