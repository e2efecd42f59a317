//! BERTScore-style semantic similarity using contextual token embeddings.
//!
//! Every token of the response is matched to its most similar token in the
//! reference (precision) and vice versa (recall).

use super::semantic::{SemanticScorer, SimilarityScore};
use crate::error::{BenchError, Result};
use async_trait::async_trait;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::{Repo, RepoType, api::sync::Api};
use std::fmt::Display;
use tokenizers::Tokenizer;

fn model_error(context: &str, err: impl Display) -> BenchError {
    BenchError::Config(format!("embedding model: {}: {}", context, err))
}

/// Semantic scorer backed by a local BERT encoder.
pub struct EmbeddingScorer {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
}

impl EmbeddingScorer {
    /// Load all-MiniLM-L6-v2 from the Hugging Face Hub.
    pub fn load_minilm() -> Result<Self> {
        Self::load("sentence-transformers/all-MiniLM-L6-v2")
    }

    /// Load a BERT-family model by Hub id.
    pub fn load(model_id: &str) -> Result<Self> {
        let device = Device::Cpu;

        let api = Api::new().map_err(|e| model_error("hub api", e))?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json").map_err(|e| model_error("config.json", e))?;
        let tokenizer_path = repo
            .get("tokenizer.json")
            .map_err(|e| model_error("tokenizer.json", e))?;
        let weights_path = repo
            .get("model.safetensors")
            .map_err(|e| model_error("model.safetensors", e))?;

        let config_text =
            std::fs::read_to_string(&config_path).map_err(|e| BenchError::io(&config_path, e))?;
        let config: BertConfig =
            serde_json::from_str(&config_text).map_err(|e| model_error("config", e))?;

        let tokenizer =
            Tokenizer::from_file(&tokenizer_path).map_err(|e| model_error("tokenizer", e))?;

        // SAFETY: the weights file is only read, and not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DTYPE, &device)
                .map_err(|e| model_error("weights", e))?
        };
        let model = BertModel::load(vb, &config).map_err(|e| model_error("bert", e))?;

        Ok(Self {
            model,
            tokenizer,
            device,
        })
    }

    /// Unit-normalized contextual embeddings, without [CLS] and [SEP].
    fn token_embeddings(&self, text: &str) -> Result<Vec<Vec<f32>>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| model_error("tokenize", e))?;

        let ids = encoding.get_ids();
        if ids.len() <= 2 {
            return Ok(Vec::new());
        }

        let forward = || -> candle_core::Result<Vec<Vec<f32>>> {
            let input_ids = Tensor::new(ids, &self.device)?.unsqueeze(0)?;
            let token_type_ids = input_ids.zeros_like()?;
            let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?
                .unsqueeze(0)?;
            let output = self
                .model
                .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
            output.squeeze(0)?.to_vec2::<f32>()
        };
        let hidden = forward().map_err(|e| model_error("forward", e))?;

        Ok(hidden[1..hidden.len() - 1]
            .iter()
            .map(|v| normalize(v))
            .collect())
    }
}

fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        v.to_vec()
    } else {
        v.iter().map(|x| x / norm).collect()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Mean best-match similarity in both directions over normalized vectors.
pub fn greedy_match(candidate: &[Vec<f32>], reference: &[Vec<f32>]) -> SimilarityScore {
    if candidate.is_empty() || reference.is_empty() {
        return SimilarityScore::default();
    }

    let best = |from: &[Vec<f32>], to: &[Vec<f32>]| -> f64 {
        let total: f64 = from
            .iter()
            .map(|a| {
                to.iter()
                    .map(|b| dot(a, b))
                    .fold(f32::NEG_INFINITY, f32::max) as f64
            })
            .sum();
        total / from.len() as f64
    };

    SimilarityScore::from_precision_recall(best(candidate, reference), best(reference, candidate))
}

#[async_trait]
impl SemanticScorer for EmbeddingScorer {
    async fn compare(&self, candidate: &str, reference: &str) -> Result<SimilarityScore> {
        let cand = self.token_embeddings(candidate)?;
        let refs = self.token_embeddings(reference)?;
        Ok(greedy_match(&cand, &refs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_match_identical() {
        let tokens = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let score = greedy_match(&tokens, &tokens);
        assert!((score.precision - 1.0).abs() < 1e-6);
        assert!((score.recall - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_greedy_match_asymmetric() {
        let candidate = vec![vec![1.0, 0.0]];
        let reference = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let score = greedy_match(&candidate, &reference);
        assert!((score.precision - 1.0).abs() < 1e-6);
        assert!((score.recall - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_greedy_match_empty() {
        assert_eq!(greedy_match(&[], &[vec![1.0]]), SimilarityScore::default());
    }

    #[test]
    fn test_normalize() {
        let v = normalize(&[3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
