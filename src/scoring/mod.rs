//! Scorers applied to generated responses.
//!
//! - [`SemanticScorer`]: overlap between a response and the ideal response
//! - [`JudgeScorer`]: single-response quality scores and pairwise preferences

pub mod judge;
pub mod semantic;

#[cfg(feature = "embeddings")]
pub mod embedding;

pub use judge::{JudgeScorer, LlmJudge, PairwiseVerdict, Preference, SingleScore};
pub use semantic::{LexicalOverlapScorer, SemanticScorer, SimilarityScore};

#[cfg(feature = "embeddings")]
pub use embedding::EmbeddingScorer;
