//! Stub collaborators for unit tests.

use crate::dialogue::{Session, Turn};
use crate::error::{BenchError, Result};
use crate::scoring::{
    JudgeScorer, PairwiseVerdict, Preference, SemanticScorer, SimilarityScore, SingleScore,
};
use crate::systems::DialogueSystem;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const CANDIDATE_REPLY: &str = "candidate reply";
pub const BASELINE_REPLY: &str = "baseline reply";

/// Returns the same reply every time and records what it was asked.
pub struct ConstantSystem {
    name: String,
    reply: String,
    pub calls: Mutex<Vec<(Session, String)>>,
}

impl ConstantSystem {
    pub fn new(name: &str, reply: &str) -> Self {
        Self {
            name: name.to_string(),
            reply: reply.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn candidate() -> Self {
        Self::new("candidate", CANDIDATE_REPLY)
    }

    pub fn baseline() -> Self {
        Self::new("baseline", BASELINE_REPLY)
    }
}

#[async_trait]
impl DialogueSystem for ConstantSystem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn process(&self, context: &Session, query: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((context.clone(), query.to_string()));
        Ok(self.reply.clone())
    }
}

/// Same similarity for every pair; remembers the references it saw.
pub struct ConstantSemantic {
    score: SimilarityScore,
    pub references: Mutex<Vec<String>>,
}

impl ConstantSemantic {
    pub fn new(precision: f64, recall: f64, f1: f64) -> Self {
        Self {
            score: SimilarityScore {
                precision,
                recall,
                f1,
            },
            references: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SemanticScorer for ConstantSemantic {
    async fn compare(&self, _candidate: &str, reference: &str) -> Result<SimilarityScore> {
        self.references.lock().unwrap().push(reference.to_string());
        Ok(self.score)
    }
}

/// Scores by response text and always prefers the same slot.
///
/// `fail_on_single` makes the n-th (1-based) single evaluation fail.
pub struct StubJudge {
    pub candidate: SingleScore,
    pub baseline: SingleScore,
    pub preference: Preference,
    pub fail_on_single: Option<usize>,
    single_calls: AtomicUsize,
    pub pairwise_order: Mutex<Vec<(String, String)>>,
}

impl StubJudge {
    pub fn new(preference: Preference) -> Self {
        Self {
            candidate: score(4.0),
            baseline: score(3.0),
            preference,
            fail_on_single: None,
            single_calls: AtomicUsize::new(0),
            pairwise_order: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on_single(mut self, n: usize) -> Self {
        self.fail_on_single = Some(n);
        self
    }
}

pub fn score(value: f64) -> SingleScore {
    SingleScore {
        faithfulness: value,
        informativeness: value,
        coherency: value,
    }
}

#[async_trait]
impl JudgeScorer for StubJudge {
    async fn evaluate_single(
        &self,
        _context: &str,
        _memory: &str,
        response: &str,
    ) -> Result<SingleScore> {
        let call = self.single_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_single == Some(call) {
            return Err(BenchError::LlmApi("judge unavailable".to_string()));
        }
        Ok(if response == CANDIDATE_REPLY {
            self.candidate
        } else {
            self.baseline
        })
    }

    async fn evaluate_pairwise(
        &self,
        _context: &str,
        _memory: &str,
        response_1: &str,
        response_2: &str,
    ) -> Result<PairwiseVerdict> {
        self.pairwise_order
            .lock()
            .unwrap()
            .push((response_1.to_string(), response_2.to_string()));
        Ok(PairwiseVerdict::uniform(self.preference))
    }
}

/// A session of `n` alternating turns whose last text is "ideal".
pub fn session_with_turns(n: usize) -> Session {
    let turns = (0..n)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            let text = if i + 1 == n {
                "ideal".to_string()
            } else {
                format!("turn {}", i)
            };
            Turn::new(role, text)
        })
        .collect();
    Session::new(turns)
}
