//! Final benchmark report and its text rendering.

use crate::accumulator::{PairwiseCounts, PairwiseTally, RawJudgeData, RawSemanticData, RunState};
use crate::stats::MetricStats;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Report schema version.
pub const RESULTS_VERSION: &str = "1.0";

/// Run metadata stored alongside the statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// RFC 3339 time at which the run finished.
    pub timestamp: String,
    /// Requested number of sessions.
    pub n_samples: usize,
    /// Turns taken as a query.
    pub message_count: usize,
    pub version: String,
    #[serde(default)]
    pub sessions_completed: usize,
    #[serde(default)]
    pub sessions_failed: usize,
}

/// Six metric summaries for one system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemResults {
    pub semantic_precision: MetricStats,
    pub semantic_recall: MetricStats,
    pub semantic_f1: MetricStats,
    pub llm_faithfulness: MetricStats,
    pub llm_informativeness: MetricStats,
    pub llm_coherency: MetricStats,
}

impl SystemResults {
    pub fn from_raw(semantic: &RawSemanticData, judge: &RawJudgeData) -> Self {
        Self {
            semantic_precision: MetricStats::from_values(&semantic.precision),
            semantic_recall: MetricStats::from_values(&semantic.recall),
            semantic_f1: MetricStats::from_values(&semantic.f1),
            llm_faithfulness: MetricStats::from_values(&judge.faithfulness),
            llm_informativeness: MetricStats::from_values(&judge.informativeness),
            llm_coherency: MetricStats::from_values(&judge.coherency),
        }
    }

    fn metrics(&self) -> [(&'static str, &MetricStats); 6] {
        [
            ("semantic_precision", &self.semantic_precision),
            ("semantic_recall", &self.semantic_recall),
            ("semantic_f1", &self.semantic_f1),
            ("llm_faithfulness", &self.llm_faithfulness),
            ("llm_informativeness", &self.llm_informativeness),
            ("llm_coherency", &self.llm_coherency),
        ]
    }
}

/// The finished report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpResults {
    pub metadata: RunMetadata,
    pub candidate_results: SystemResults,
    pub baseline_results: SystemResults,
    pub pairwise_results: PairwiseTally,
}

impl McpResults {
    /// Summarize `state`. Pure: the same state and metadata give the same report.
    pub fn aggregate(state: &RunState, timestamp: &str, n_samples: usize) -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: timestamp.to_string(),
                n_samples,
                message_count: state.message_count,
                version: RESULTS_VERSION.to_string(),
                sessions_completed: state.sessions_completed,
                sessions_failed: state.sessions_failed,
            },
            candidate_results: SystemResults::from_raw(
                &state.candidate_semantic,
                &state.candidate_judge,
            ),
            baseline_results: SystemResults::from_raw(
                &state.baseline_semantic,
                &state.baseline_judge,
            ),
            pairwise_results: state.pairwise,
        }
    }

    /// First statistic holding NaN or infinity, as `system.metric`.
    ///
    /// JSON has no encoding for such values, so a report containing one
    /// cannot be saved and read back.
    pub fn non_finite_metric(&self) -> Option<String> {
        [
            ("candidate_results", &self.candidate_results),
            ("baseline_results", &self.baseline_results),
        ]
        .into_iter()
        .flat_map(|(system, results)| {
            results
                .metrics()
                .into_iter()
                .map(move |(metric, stats)| (system, metric, stats))
        })
        .find(|(_, _, stats)| !stats.is_finite())
        .map(|(system, metric, _)| format!("{}.{}", system, metric))
    }

    /// Human-readable report: semantic, single-judgment, then pairwise blocks.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "\nProcessed {} messages\n", self.metadata.message_count);
        if self.metadata.sessions_failed > 0 {
            let _ = writeln!(
                out,
                "Sessions: {} completed, {} aborted early\n",
                self.metadata.sessions_completed, self.metadata.sessions_failed
            );
        }

        self.render_semantic(&mut out);
        self.render_single(&mut out);
        self.render_pairwise(&mut out);
        out
    }

    /// Print the summary to stdout.
    pub fn print_summary(&self) {
        print!("{}", self.render_summary());
    }

    fn render_semantic(&self, out: &mut String) {
        section_header(out, "SEMANTIC EVALUATION RESULTS");
        for (label, r) in self.systems() {
            let _ = writeln!(
                out,
                "{:<10}- Precision: {:.4} (±{:.4}), Recall: {:.4} (±{:.4}), F1: {:.4} (±{:.4})",
                label,
                r.semantic_precision.mean,
                r.semantic_precision.std,
                r.semantic_recall.mean,
                r.semantic_recall.std,
                r.semantic_f1.mean,
                r.semantic_f1.std,
            );
        }
        out.push('\n');
    }

    fn render_single(&self, out: &mut String) {
        section_header(out, "LLM SINGLE EVALUATION RESULTS");
        for (label, r) in self.systems() {
            let _ = writeln!(
                out,
                "{:<10}- Faithfulness: {:.2} (±{:.2}), Informativeness: {:.2} (±{:.2}), Coherency: {:.2} (±{:.2})",
                label,
                r.llm_faithfulness.mean,
                r.llm_faithfulness.std,
                r.llm_informativeness.mean,
                r.llm_informativeness.std,
                r.llm_coherency.mean,
                r.llm_coherency.std,
            );
        }
        out.push('\n');
    }

    fn render_pairwise(&self, out: &mut String) {
        let total = self.pairwise_results.get_total_count();
        if total == 0 {
            out.push_str("No pairwise evaluations completed.\n");
            return;
        }

        section_header(out, "LLM PAIRWISE EVALUATION RESULTS");
        let p = &self.pairwise_results;
        for (label, counts) in [
            ("Faithfulness", &p.faithfulness),
            ("Informativeness", &p.informativeness),
            ("Coherency", &p.coherency),
        ] {
            let _ = writeln!(out, "{:<15}: {}", label, pairwise_line(counts, total));
        }
    }

    fn systems(&self) -> [(&'static str, &SystemResults); 2] {
        [
            ("Candidate", &self.candidate_results),
            ("Baseline", &self.baseline_results),
        ]
    }
}

fn section_header(out: &mut String, title: &str) {
    let rule = "=".repeat(50);
    let _ = writeln!(out, "{}\n{}\n{}", rule, title, rule);
}

fn pairwise_line(counts: &PairwiseCounts, total: usize) -> String {
    let pct = |n: usize| n as f64 / total as f64 * 100.0;
    format!(
        "Candidate {}/{} ({:.1}%), Baseline {}/{} ({:.1}%), Draws {}/{} ({:.1}%)",
        counts.candidate,
        total,
        pct(counts.candidate),
        counts.baseline,
        total,
        pct(counts.baseline),
        counts.draw,
        total,
        pct(counts.draw),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::TurnSamples;
    use crate::scoring::{PairwiseVerdict, Preference, SimilarityScore};
    use crate::testing::score;

    fn state_with_turns(verdicts: &[(Preference, bool)]) -> RunState {
        let mut state = RunState::new();
        for (i, &(preference, candidate_first)) in verdicts.iter().enumerate() {
            state.message_count += 1;
            state.commit(TurnSamples {
                candidate_semantic: SimilarityScore::from_precision_recall(0.5, 0.5),
                baseline_semantic: SimilarityScore::from_precision_recall(0.1 * i as f64, 0.3),
                candidate_judge: score(4.0),
                baseline_judge: score(3.0),
                verdict: PairwiseVerdict::uniform(preference),
                candidate_first,
            });
        }
        state.sessions_completed = 1;
        state
    }

    #[test]
    fn test_aggregate() {
        let state = state_with_turns(&[(Preference::FirstBetter, true), (Preference::Tie, false)]);
        let report = McpResults::aggregate(&state, "2026-01-01T00:00:00Z", 30);

        assert_eq!(report.metadata.message_count, 2);
        assert_eq!(report.metadata.n_samples, 30);
        assert_eq!(report.metadata.version, RESULTS_VERSION);
        assert_eq!(report.candidate_results.semantic_precision.mean, 0.5);
        assert_eq!(report.candidate_results.semantic_precision.count, 2);
        assert_eq!(report.candidate_results.llm_faithfulness.mean, 4.0);
        assert_eq!(report.baseline_results.llm_faithfulness.mean, 3.0);
        assert_eq!(report.pairwise_results.faithfulness.candidate, 1);
        assert_eq!(report.pairwise_results.faithfulness.draw, 1);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let state = state_with_turns(&[(Preference::SecondBetter, true); 3]);
        let a = McpResults::aggregate(&state, "t", 3);
        let b = McpResults::aggregate(&state, "t", 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_run_renders_no_data_notice() {
        let report = McpResults::aggregate(&RunState::new(), "t", 0);
        assert_eq!(report.candidate_results, SystemResults::default());

        let text = report.render_summary();
        assert!(text.contains("Processed 0 messages"));
        assert!(text.contains("SEMANTIC EVALUATION RESULTS"));
        assert!(text.contains("No pairwise evaluations completed."));
        assert!(!text.contains("LLM PAIRWISE EVALUATION RESULTS"));
        assert!(!text.contains("NaN"));
    }

    #[test]
    fn test_summary_blocks_in_order() {
        let state = state_with_turns(&[
            (Preference::FirstBetter, true),
            (Preference::FirstBetter, false),
            (Preference::Tie, true),
            (Preference::SecondBetter, false),
        ]);
        let text = McpResults::aggregate(&state, "t", 1).render_summary();

        let semantic = text.find("SEMANTIC EVALUATION RESULTS").unwrap();
        let single = text.find("LLM SINGLE EVALUATION RESULTS").unwrap();
        let pairwise = text.find("LLM PAIRWISE EVALUATION RESULTS").unwrap();
        assert!(semantic < single && single < pairwise);

        assert!(text.contains(
            "Faithfulness   : Candidate 2/4 (50.0%), Baseline 1/4 (25.0%), Draws 1/4 (25.0%)"
        ));
    }

    #[test]
    fn test_document_shape() {
        let report = McpResults::aggregate(&state_with_turns(&[(Preference::Tie, true)]), "t", 1);
        let value = serde_json::to_value(&report).unwrap();

        for key in ["timestamp", "n_samples", "message_count", "version"] {
            assert!(value["metadata"].get(key).is_some(), "{}", key);
        }
        assert_eq!(value["candidate_results"]["semantic_f1"]["count"], 1);
        assert_eq!(value["pairwise_results"]["coherency"]["draw"], 1);
        assert!(value["baseline_results"]["llm_coherency"].get("std").is_some());
    }
}
