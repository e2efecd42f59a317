//! OpenAI-compatible LLM client.
//!
//! Shared by the LLM-backed systems under test and the judge.

use crate::config::LlmConfig;
use crate::error::{BenchError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Message role in a chat request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A message in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Request body for chat completion.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Response from chat completion.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible LLM client.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    config: LlmConfig,
}

impl LlmClient {
    /// Create a new LLM client with the given configuration.
    pub fn new(config: LlmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Model name requests are sent to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the API endpoint URL.
    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/chat/completions", base)
    }

    /// Send a chat completion request and return the reply text.
    pub async fn chat(&self, messages: &[Message]) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: Some(self.config.max_tokens),
            temperature: Some(self.config.temperature),
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&body) {
                return Err(BenchError::LlmApi(format!(
                    "API error ({}): {}",
                    status, api_error.error.message
                )));
            }
            return Err(BenchError::LlmApi(format!(
                "Request failed ({}): {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &completion.usage {
            debug!(
                model = %self.config.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion"
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| BenchError::LlmApi("No content in response".to_string()))
    }

    /// Convenience method: single user message with optional system prompt.
    pub async fn complete(&self, system: Option<&str>, user: &str) -> Result<String> {
        let mut messages = Vec::with_capacity(2);

        if let Some(sys) = system {
            messages.push(Message::system(sys));
        }
        messages.push(Message::user(user));

        self.chat(&messages).await
    }

    /// Test connectivity to the API.
    pub async fn test_connection(&self) -> Result<()> {
        let reply = self
            .complete(None, "Say 'hello' and nothing else.")
            .await?;

        if reply.to_lowercase().contains("hello") {
            Ok(())
        } else {
            Err(BenchError::LlmApi(format!("Unexpected response: {}", reply)))
        }
    }
}
