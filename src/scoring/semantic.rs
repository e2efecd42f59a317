//! Semantic overlap between a response and a reference.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Precision, recall and F1 of a response against a reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl SimilarityScore {
    /// Build a score from precision and recall, deriving F1.
    pub fn from_precision_recall(precision: f64, recall: f64) -> Self {
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };
        Self {
            precision,
            recall,
            f1,
        }
    }

    /// Whether every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.precision.is_finite() && self.recall.is_finite() && self.f1.is_finite()
    }
}

/// Compares a generated response with the ideal response.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    /// Score `candidate` against `reference`.
    async fn compare(&self, candidate: &str, reference: &str) -> Result<SimilarityScore>;
}

/// Clipped unigram overlap on lowercased alphanumeric tokens.
#[derive(Debug, Clone, Default)]
pub struct LexicalOverlapScorer;

impl LexicalOverlapScorer {
    pub fn new() -> Self {
        Self
    }

    fn tokens(text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect()
    }

    fn counts(tokens: &[String]) -> HashMap<&str, usize> {
        let mut counts = HashMap::new();
        for token in tokens {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Synchronous scoring, shared by the trait impl and tests.
    pub fn score(&self, candidate: &str, reference: &str) -> SimilarityScore {
        let cand_tokens = Self::tokens(candidate);
        let ref_tokens = Self::tokens(reference);

        if cand_tokens.is_empty() || ref_tokens.is_empty() {
            return SimilarityScore::default();
        }

        let cand_counts = Self::counts(&cand_tokens);
        let ref_counts = Self::counts(&ref_tokens);

        let overlap: usize = cand_counts
            .iter()
            .map(|(token, &n)| n.min(ref_counts.get(token).copied().unwrap_or(0)))
            .sum();

        let precision = overlap as f64 / cand_tokens.len() as f64;
        let recall = overlap as f64 / ref_tokens.len() as f64;
        SimilarityScore::from_precision_recall(precision, recall)
    }
}

#[async_trait]
impl SemanticScorer for LexicalOverlapScorer {
    async fn compare(&self, candidate: &str, reference: &str) -> Result<SimilarityScore> {
        Ok(self.score(candidate, reference))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text() {
        let score = LexicalOverlapScorer::new().score("The cat sat.", "the cat sat");
        assert_eq!(score.precision, 1.0);
        assert_eq!(score.recall, 1.0);
        assert_eq!(score.f1, 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        // 2 of 4 candidate tokens match; 2 of 2 reference tokens are covered.
        let score = LexicalOverlapScorer::new().score("red apple green pear", "red apple");
        assert!((score.precision - 0.5).abs() < 1e-12);
        assert!((score.recall - 1.0).abs() < 1e-12);
        assert!((score.f1 - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_tokens_are_clipped() {
        let score = LexicalOverlapScorer::new().score("yes yes yes yes", "yes no");
        assert!((score.precision - 0.25).abs() < 1e-12);
        assert!((score.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        let scorer = LexicalOverlapScorer::new();
        assert_eq!(scorer.score("", "reference"), SimilarityScore::default());
        assert_eq!(scorer.score("candidate", "  "), SimilarityScore::default());
    }

    #[test]
    fn test_trait_compare() {
        let scorer = LexicalOverlapScorer::new();
        let score = tokio_test::block_on(scorer.compare("a b", "a c")).unwrap();
        assert!((score.f1 - 0.5).abs() < 1e-12);
    }
}
