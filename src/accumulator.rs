//! Raw score buffers and pairwise tallies collected during replay.

use crate::scoring::{PairwiseVerdict, Preference, SimilarityScore, SingleScore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Semantic scores for one system, one entry per processed turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSemanticData {
    pub precision: Vec<f64>,
    pub recall: Vec<f64>,
    pub f1: Vec<f64>,
}

impl RawSemanticData {
    fn push(&mut self, score: SimilarityScore) {
        self.precision.push(score.precision);
        self.recall.push(score.recall);
        self.f1.push(score.f1);
    }

    fn extend(&mut self, other: RawSemanticData) {
        self.precision.extend(other.precision);
        self.recall.extend(other.recall);
        self.f1.extend(other.f1);
    }

    pub fn len(&self) -> usize {
        self.f1.len()
    }

    pub fn is_empty(&self) -> bool {
        self.f1.is_empty()
    }
}

/// Judge scores for one system, one entry per processed turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawJudgeData {
    pub faithfulness: Vec<f64>,
    pub informativeness: Vec<f64>,
    pub coherency: Vec<f64>,
}

impl RawJudgeData {
    fn push(&mut self, score: SingleScore) {
        self.faithfulness.push(score.faithfulness);
        self.informativeness.push(score.informativeness);
        self.coherency.push(score.coherency);
    }

    fn extend(&mut self, other: RawJudgeData) {
        self.faithfulness.extend(other.faithfulness);
        self.informativeness.extend(other.informativeness);
        self.coherency.extend(other.coherency);
    }

    pub fn len(&self) -> usize {
        self.coherency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coherency.is_empty()
    }
}

/// Win/loss/draw counters for one criterion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseCounts {
    pub candidate: usize,
    pub baseline: usize,
    pub draw: usize,
}

impl PairwiseCounts {
    /// Count one outcome, given which system was shown first.
    fn record(&mut self, preference: Preference, candidate_first: bool) {
        match (preference, candidate_first) {
            (Preference::FirstBetter, true) | (Preference::SecondBetter, false) => {
                self.candidate += 1
            }
            (Preference::FirstBetter, false) | (Preference::SecondBetter, true) => {
                self.baseline += 1
            }
            (Preference::Tie, _) => self.draw += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.candidate + self.baseline + self.draw
    }

    fn add(&mut self, other: &PairwiseCounts) {
        self.candidate += other.candidate;
        self.baseline += other.baseline;
        self.draw += other.draw;
    }
}

/// Per-criterion pairwise counters keyed by system, not by presentation slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseTally {
    pub faithfulness: PairwiseCounts,
    pub informativeness: PairwiseCounts,
    pub coherency: PairwiseCounts,
}

impl PairwiseTally {
    /// Map a position-relative verdict back onto candidate/baseline.
    pub fn record(&mut self, verdict: &PairwiseVerdict, candidate_first: bool) {
        self.faithfulness.record(verdict.faithfulness, candidate_first);
        self.informativeness
            .record(verdict.informativeness, candidate_first);
        self.coherency.record(verdict.coherency, candidate_first);
    }

    /// Number of recorded pairwise judgments.
    ///
    /// Every criterion is recorded once per judgment, so any of them gives the total.
    pub fn get_total_count(&self) -> usize {
        self.faithfulness.total()
    }

    fn add(&mut self, other: &PairwiseTally) {
        self.faithfulness.add(&other.faithfulness);
        self.informativeness.add(&other.informativeness);
        self.coherency.add(&other.coherency);
    }
}

/// Everything scored for one turn, committed to [`RunState`] in one step.
#[derive(Debug, Clone)]
pub struct TurnSamples {
    pub candidate_semantic: SimilarityScore,
    pub baseline_semantic: SimilarityScore,
    pub candidate_judge: SingleScore,
    pub baseline_judge: SingleScore,
    pub verdict: PairwiseVerdict,
    pub candidate_first: bool,
}

/// Mutable state of a benchmark run.
///
/// Buffers grow only through [`RunState::commit`], which keeps the candidate
/// and baseline buffers of every metric at the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    pub candidate_semantic: RawSemanticData,
    pub baseline_semantic: RawSemanticData,
    pub candidate_judge: RawJudgeData,
    pub baseline_judge: RawJudgeData,
    pub pairwise: PairwiseTally,
    /// Turns taken as a query, including any that failed mid-turn.
    pub message_count: usize,
    pub sessions_completed: usize,
    pub sessions_failed: usize,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one fully scored turn.
    pub fn commit(&mut self, samples: TurnSamples) {
        self.candidate_semantic.push(samples.candidate_semantic);
        self.baseline_semantic.push(samples.baseline_semantic);
        self.candidate_judge.push(samples.candidate_judge);
        self.baseline_judge.push(samples.baseline_judge);
        self.pairwise
            .record(&samples.verdict, samples.candidate_first);
    }

    /// Number of fully scored turns.
    pub fn scored_turns(&self) -> usize {
        self.candidate_semantic.len()
    }

    /// Append another shard's samples after this one's.
    ///
    /// Merging shards in session-index order reproduces a sequential run.
    pub fn merge(&mut self, other: RunState) {
        self.candidate_semantic.extend(other.candidate_semantic);
        self.baseline_semantic.extend(other.baseline_semantic);
        self.candidate_judge.extend(other.candidate_judge);
        self.baseline_judge.extend(other.baseline_judge);
        self.pairwise.add(&other.pairwise);
        self.message_count += other.message_count;
        self.sessions_completed += other.sessions_completed;
        self.sessions_failed += other.sessions_failed;
    }
}

/// Decides which system is shown first in a pairwise judgment.
pub trait OrderSource: Send {
    /// `true` when the candidate response goes first.
    fn candidate_first(&mut self) -> bool;
}

/// Fair coin flip, seedable for reproducible runs.
pub struct RandomOrder {
    rng: StdRng,
}

impl RandomOrder {
    /// Seed from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seeded when `seed` is set, entropy otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }
}

impl Default for RandomOrder {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderSource for RandomOrder {
    fn candidate_first(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

/// Always the same order.
#[derive(Debug, Clone, Copy)]
pub struct FixedOrder(pub bool);

impl OrderSource for FixedOrder {
    fn candidate_first(&mut self) -> bool {
        self.0
    }
}
