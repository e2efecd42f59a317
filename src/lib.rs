//! MCP Bench - a comparative benchmark harness for dialogue response systems.
//!
//! Multi-turn dialogues are replayed against a candidate and a baseline
//! system. Every response is scored against the held-out ideal response
//! (semantic overlap), judged on its own (faithfulness, informativeness,
//! coherency) and judged against the other system's response with the
//! presentation order randomized.
//!
//! # Quick Start
//!
//! ```no_run
//! use mcp_bench::{
//!     config::Config,
//!     dataset::create_sample_dataset,
//!     orchestrator::Orchestrator,
//!     scoring::LexicalOverlapScorer,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let dataset = create_sample_dataset();
//!     let mut orchestrator =
//!         Orchestrator::from_config(&config, dataset, Box::new(LexicalOverlapScorer::new()));
//!
//!     orchestrator.calculate().await?;
//!     orchestrator.print_summary().await?;
//!
//!     let path = orchestrator.save(None).await?;
//!     println!("Results have been saved to: {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **DialogueReplayEngine**: reveals a session turn by turn and scores both systems
//! - **RunState**: raw score buffers and the pairwise tally
//! - **McpResults**: descriptive statistics, rendering and serialization
//! - **Orchestrator**: owns the dataset and collaborators and runs the benchmark

pub mod accumulator;
pub mod config;
pub mod dataset;
pub mod dialogue;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod persistence;
pub mod replay;
pub mod results;
pub mod scoring;
pub mod stats;
pub mod systems;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use accumulator::{FixedOrder, OrderSource, PairwiseTally, RandomOrder, RunState};
pub use config::Config;
pub use dataset::{DialogueDataset, create_sample_dataset};
pub use dialogue::{Session, Turn};
pub use error::{BenchError, Result};
pub use orchestrator::Orchestrator;
pub use persistence::{load_results, save_results};
pub use replay::DialogueReplayEngine;
pub use results::{McpResults, SystemResults};
pub use stats::MetricStats;
pub use systems::{DialogueSystem, LlmResponder};
