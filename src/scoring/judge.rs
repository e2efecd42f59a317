//! LLM-as-Judge scoring of dialogue responses.

use crate::error::{BenchError, Result};
use crate::llm::{LlmClient, Prompts};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Quality scores for a single response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SingleScore {
    pub faithfulness: f64,
    pub informativeness: f64,
    pub coherency: f64,
}

impl SingleScore {
    /// Whether every criterion is a finite number.
    pub fn is_finite(&self) -> bool {
        self.faithfulness.is_finite() && self.informativeness.is_finite() && self.coherency.is_finite()
    }
}

/// Outcome of one pairwise criterion, relative to presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    FirstBetter,
    SecondBetter,
    Tie,
}

impl Preference {
    /// Parse a judge label. Anything unrecognized counts as a tie.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "1" | "a" | "first" | "response 1" | "response_1" => Preference::FirstBetter,
            "2" | "b" | "second" | "response 2" | "response_2" => Preference::SecondBetter,
            _ => Preference::Tie,
        }
    }
}

/// Per-criterion pairwise outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseVerdict {
    pub faithfulness: Preference,
    pub informativeness: Preference,
    pub coherency: Preference,
}

impl PairwiseVerdict {
    /// The same outcome on every criterion.
    pub fn uniform(preference: Preference) -> Self {
        Self {
            faithfulness: preference,
            informativeness: preference,
            coherency: preference,
        }
    }
}

/// Judges response quality, alone or against a competitor.
#[async_trait]
pub trait JudgeScorer: Send + Sync {
    /// Score one response given the dialogue context and memory.
    async fn evaluate_single(&self, context: &str, memory: &str, response: &str)
    -> Result<SingleScore>;

    /// Compare two responses, in the order given.
    async fn evaluate_pairwise(
        &self,
        context: &str,
        memory: &str,
        response_1: &str,
        response_2: &str,
    ) -> Result<PairwiseVerdict>;
}

/// LLM-backed judge.
pub struct LlmJudge {
    client: LlmClient,
}

impl LlmJudge {
    /// Create a new judge with the given LLM client.
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }

    fn pairwise_prompt(context: &str, memory: &str, response_1: &str, response_2: &str) -> String {
        Prompts::fill(
            Prompts::judge_pairwise(),
            &[
                ("context", context),
                ("memory", memory),
                ("response_1", response_1),
                ("response_2", response_2),
            ],
        )
    }

    /// Parse single-response JSON. Scores are clamped to 1..=5.
    fn parse_single_response(response: &str) -> Result<SingleScore> {
        let json_str = Self::extract_json(response);

        #[derive(Deserialize)]
        struct RawSingleScore {
            faithfulness: f64,
            informativeness: f64,
            coherency: f64,
        }

        let raw: RawSingleScore = serde_json::from_str(&json_str).map_err(|e| {
            BenchError::LlmParse(format!(
                "Failed to parse single judgment: {}. Response: {}",
                e, response
            ))
        })?;

        Ok(SingleScore {
            faithfulness: raw.faithfulness.clamp(1.0, 5.0),
            informativeness: raw.informativeness.clamp(1.0, 5.0),
            coherency: raw.coherency.clamp(1.0, 5.0),
        })
    }

    /// Parse pairwise JSON.
    fn parse_pairwise_response(response: &str) -> Result<PairwiseVerdict> {
        let json_str = Self::extract_json(response);

        // Judges sometimes answer with bare numbers instead of strings.
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Label {
            Text(String),
            Number(i64),
        }

        impl Label {
            fn preference(&self) -> Preference {
                match self {
                    Label::Text(s) => Preference::from_label(s),
                    Label::Number(n) => Preference::from_label(&n.to_string()),
                }
            }
        }

        #[derive(Deserialize)]
        struct RawPairwise {
            faithfulness: Label,
            informativeness: Label,
            coherency: Label,
        }

        let raw: RawPairwise = serde_json::from_str(&json_str).map_err(|e| {
            BenchError::LlmParse(format!(
                "Failed to parse pairwise judgment: {}. Response: {}",
                e, response
            ))
        })?;

        Ok(PairwiseVerdict {
            faithfulness: raw.faithfulness.preference(),
            informativeness: raw.informativeness.preference(),
            coherency: raw.coherency.preference(),
        })
    }

    /// Extract JSON from response.
    fn extract_json(response: &str) -> String {
        let response = response.trim();

        if let Some(fenced) = response.strip_prefix("```") {
            let body = fenced.split_once('\n').map(|(_, rest)| rest).unwrap_or(fenced);
            if let Some(end) = body.rfind("```") {
                return body[..end].trim().to_string();
            }
        }

        if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
            if end > start {
                return response[start..=end].to_string();
            }
        }

        response.to_string()
    }
}

#[async_trait]
impl JudgeScorer for LlmJudge {
    async fn evaluate_single(
        &self,
        context: &str,
        memory: &str,
        response: &str,
    ) -> Result<SingleScore> {
        let prompt = Prompts::fill(
            Prompts::judge_single(),
            &[
                ("context", context),
                ("memory", memory),
                ("response", response),
            ],
        );

        let reply = self
            .client
            .complete(Some(Prompts::judge_system()), &prompt)
            .await?;
        Self::parse_single_response(&reply)
    }

    async fn evaluate_pairwise(
        &self,
        context: &str,
        memory: &str,
        response_1: &str,
        response_2: &str,
    ) -> Result<PairwiseVerdict> {
        let prompt = Self::pairwise_prompt(context, memory, response_1, response_2);

        let reply = self
            .client
            .complete(Some(Prompts::judge_system()), &prompt)
            .await?;
        Self::parse_pairwise_response(&reply)
    }
}
