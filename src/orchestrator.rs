//! Top-level benchmark driver.

use crate::accumulator::{OrderSource, RandomOrder, RunState};
use crate::config::Config;
use crate::dataset::DialogueDataset;
use crate::error::Result;
use crate::llm::LlmClient;
use crate::persistence::{default_results_path, save_results};
use crate::replay::DialogueReplayEngine;
use crate::results::McpResults;
use crate::scoring::{JudgeScorer, LlmJudge, SemanticScorer};
use crate::systems::{DialogueSystem, LlmResponder};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Owns the dataset, the collaborators and the run state.
///
/// `calculate` runs once; `results` runs it on demand and caches the report
/// until `reset`.
pub struct Orchestrator {
    dataset: DialogueDataset,
    candidate: Box<dyn DialogueSystem>,
    baseline: Box<dyn DialogueSystem>,
    semantic: Box<dyn SemanticScorer>,
    judge: Box<dyn JudgeScorer>,
    order: Box<dyn OrderSource>,
    n_samples: usize,
    output_dir: PathBuf,
    state: RunState,
    finished_at: Option<String>,
    report: Option<McpResults>,
}

impl Orchestrator {
    pub fn new(
        dataset: DialogueDataset,
        candidate: Box<dyn DialogueSystem>,
        baseline: Box<dyn DialogueSystem>,
        semantic: Box<dyn SemanticScorer>,
        judge: Box<dyn JudgeScorer>,
        order: Box<dyn OrderSource>,
        n_samples: usize,
    ) -> Self {
        Self {
            dataset,
            candidate,
            baseline,
            semantic,
            judge,
            order,
            n_samples,
            output_dir: PathBuf::from("."),
            state: RunState::new(),
            finished_at: None,
            report: None,
        }
    }

    /// LLM-backed responders and judge, as configured.
    pub fn from_config(
        config: &Config,
        dataset: DialogueDataset,
        semantic: Box<dyn SemanticScorer>,
    ) -> Self {
        let client = LlmClient::new(config.llm.clone());
        let bench = &config.bench;

        Self::new(
            dataset,
            Box::new(LlmResponder::new(client.clone(), bench.candidate.clone())),
            Box::new(LlmResponder::new(client.clone(), bench.baseline.clone())),
            semantic,
            Box::new(LlmJudge::new(client)),
            Box::new(RandomOrder::from_seed(bench.seed)),
            bench.n_samples,
        )
        .with_output_dir(&bench.output_dir)
    }

    /// Directory used by `save(None)`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn is_calculated(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Accumulated raw samples.
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Replay every session. Does nothing if already calculated.
    ///
    /// A session whose replay fails is counted and skipped; its earlier turns
    /// stay in the accumulators.
    pub async fn calculate(&mut self) -> Result<()> {
        if self.is_calculated() {
            return Ok(());
        }

        let total = self.dataset.len();
        info!(
            sessions = total,
            candidate = self.candidate.name(),
            baseline = self.baseline.name(),
            "starting benchmark"
        );

        let engine = DialogueReplayEngine::new(
            self.candidate.as_ref(),
            self.baseline.as_ref(),
            self.semantic.as_ref(),
            self.judge.as_ref(),
        );

        for (idx, item) in self.dataset.items.iter().enumerate() {
            println!(
                "[{}/{}] Session {} ({} turns)",
                idx + 1,
                total,
                item.id,
                item.turns.len()
            );

            match engine
                .replay(&item.turns, &item.memory, self.order.as_mut(), &mut self.state)
                .await
            {
                Ok(turns) => {
                    self.state.sessions_completed += 1;
                    info!(session = idx, id = %item.id, turns, "session replayed");
                }
                Err(e) => {
                    self.state.sessions_failed += 1;
                    warn!(session = idx, id = %item.id, error = %e, "session aborted");
                    println!("  aborted: {}", e);
                }
            }
        }

        self.finished_at = Some(Local::now().to_rfc3339());
        self.report = None;
        Ok(())
    }

    /// Drop all samples and the cached report.
    pub fn reset(&mut self) {
        self.state = RunState::new();
        self.finished_at = None;
        self.report = None;
    }

    /// The report, calculating first if needed. Cached after the first call.
    pub async fn results(&mut self) -> Result<&McpResults> {
        self.calculate().await?;
        let report = match self.report.take() {
            Some(report) => report,
            None => self.build_report(),
        };
        let report: &McpResults = self.report.insert(report);
        Ok(report)
    }

    /// Rebuild the cached report from the current accumulators.
    ///
    /// Gives identical statistics when nothing was accumulated in between.
    pub fn recompute(&mut self) -> &McpResults {
        let report = self.build_report();
        &*self.report.insert(report)
    }

    fn build_report(&self) -> McpResults {
        let timestamp = self
            .finished_at
            .clone()
            .unwrap_or_else(|| Local::now().to_rfc3339());
        McpResults::aggregate(&self.state, &timestamp, self.n_samples)
    }

    /// Write the report to `path`, or to a timestamped file in the output
    /// directory. Returns the path written.
    pub async fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_results_path(&self.output_dir, Local::now()),
        };

        let report = self.results().await?;
        save_results(report, &path)?;
        info!(path = %path.display(), "results saved");
        Ok(path)
    }

    /// Print the report summary to stdout.
    pub async fn print_summary(&mut self) -> Result<()> {
        self.results().await?.print_summary();
        Ok(())
    }
}
