//! Turn-by-turn dialogue replay.
//!
//! A session is revealed from the end. Its last turn is held back as the ideal
//! response; each earlier turn, latest first, becomes a query answered by both
//! systems given the turns still before it.

use crate::accumulator::{OrderSource, RunState, TurnSamples};
use crate::dialogue::Session;
use crate::error::{BenchError, Result};
use crate::scoring::{JudgeScorer, SemanticScorer};
use crate::systems::DialogueSystem;
use tracing::debug;

/// Drives both systems and both scorers over one session at a time.
pub struct DialogueReplayEngine<'a> {
    candidate: &'a dyn DialogueSystem,
    baseline: &'a dyn DialogueSystem,
    semantic: &'a dyn SemanticScorer,
    judge: &'a dyn JudgeScorer,
}

impl<'a> DialogueReplayEngine<'a> {
    pub fn new(
        candidate: &'a dyn DialogueSystem,
        baseline: &'a dyn DialogueSystem,
        semantic: &'a dyn SemanticScorer,
        judge: &'a dyn JudgeScorer,
    ) -> Self {
        Self {
            candidate,
            baseline,
            semantic,
            judge,
        }
    }

    /// Replay `session` and commit one set of samples per turn into `state`.
    ///
    /// Returns the number of turns scored (`len - 1`, or 0 for sessions of at
    /// most one turn). On error, turns committed before the failing one stay
    /// in `state`.
    pub async fn replay(
        &self,
        session: &Session,
        memory: &str,
        order: &mut dyn OrderSource,
        state: &mut RunState,
    ) -> Result<usize> {
        let mut remaining = session.clone();
        let Some(ideal) = remaining.pop() else {
            return Ok(0);
        };

        let mut scored = 0;
        while let Some(query) = remaining.pop() {
            state.message_count += 1;

            let samples = self
                .score_turn(&remaining, &query.text, &ideal.text, memory, order)
                .await?;
            state.commit(samples);
            scored += 1;

            debug!(turn = state.message_count, remaining = remaining.len(), "turn scored");
        }

        Ok(scored)
    }

    async fn score_turn(
        &self,
        context: &Session,
        query: &str,
        ideal: &str,
        memory: &str,
        order: &mut dyn OrderSource,
    ) -> Result<TurnSamples> {
        let candidate_response = self
            .candidate
            .process(context, query)
            .await
            .map_err(|e| BenchError::collaborator("candidate system", e))?;
        let baseline_response = self
            .baseline
            .process(context, query)
            .await
            .map_err(|e| BenchError::collaborator("baseline system", e))?;

        let candidate_semantic = self
            .semantic
            .compare(&candidate_response, ideal)
            .await
            .map_err(|e| BenchError::collaborator("semantic scorer", e))?;
        let baseline_semantic = self
            .semantic
            .compare(&baseline_response, ideal)
            .await
            .map_err(|e| BenchError::collaborator("semantic scorer", e))?;
        for score in [&candidate_semantic, &baseline_semantic] {
            if !score.is_finite() {
                return Err(BenchError::collaborator(
                    "semantic scorer",
                    format!("non-finite score {:?}", score),
                ));
            }
        }

        let judge_context = context.last().map(|t| t.to_string()).unwrap_or_default();

        let candidate_judge = self
            .judge
            .evaluate_single(&judge_context, memory, &candidate_response)
            .await
            .map_err(|e| BenchError::collaborator("single judgment", e))?;
        let baseline_judge = self
            .judge
            .evaluate_single(&judge_context, memory, &baseline_response)
            .await
            .map_err(|e| BenchError::collaborator("single judgment", e))?;
        for score in [&candidate_judge, &baseline_judge] {
            if !score.is_finite() {
                return Err(BenchError::collaborator(
                    "single judgment",
                    format!("non-finite score {:?}", score),
                ));
            }
        }

        let candidate_first = order.candidate_first();
        let (first, second) = if candidate_first {
            (&candidate_response, &baseline_response)
        } else {
            (&baseline_response, &candidate_response)
        };
        let verdict = self
            .judge
            .evaluate_pairwise(&judge_context, memory, first, second)
            .await
            .map_err(|e| BenchError::collaborator("pairwise judgment", e))?;

        Ok(TurnSamples {
            candidate_semantic,
            baseline_semantic,
            candidate_judge,
            baseline_judge,
            verdict,
            candidate_first,
        })
    }
}
