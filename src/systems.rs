//! Systems under test.
//!
//! The candidate and the baseline both implement [`DialogueSystem`]; the
//! replay engine drives them through the trait only.

use crate::config::ResponderConfig;
use crate::dialogue::Session;
use crate::error::Result;
use crate::llm::{LlmClient, Message, Role};
use async_trait::async_trait;

/// A response-generation system under test.
#[async_trait]
pub trait DialogueSystem: Send + Sync {
    /// Label used in progress output.
    fn name(&self) -> &str;

    /// Reply to `query` given the preceding dialogue. Must not depend on
    /// anything beyond `context` and `query`.
    async fn process(&self, context: &Session, query: &str) -> Result<String>;
}

/// Chat-completion responder.
///
/// Context turns are replayed as chat history. Turns labelled `user` or
/// `assistant` keep that role; any other speaker label gets an alternating
/// role counted back from the query, so the turn just before it is the
/// assistant's, the one before that the user's, and so on.
pub struct LlmResponder {
    client: LlmClient,
    config: ResponderConfig,
}

impl LlmResponder {
    /// Create a responder on an existing client.
    pub fn new(client: LlmClient, config: ResponderConfig) -> Self {
        Self { client, config }
    }

    /// Build the chat request for one query.
    fn build_messages(&self, context: &Session, query: &str) -> Vec<Message> {
        let history = match self.config.context_window {
            Some(n) => context.tail(n),
            None => context.turns(),
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        if !self.config.system_prompt.is_empty() {
            messages.push(Message::system(self.config.system_prompt.as_str()));
        }

        let len = history.len();
        for (i, turn) in history.iter().enumerate() {
            let role = match turn.role.trim().to_lowercase().as_str() {
                "user" => Role::User,
                "assistant" => Role::Assistant,
                _ if (len - i) % 2 == 1 => Role::Assistant,
                _ => Role::User,
            };
            messages.push(Message::new(role, turn.text.as_str()));
        }

        messages.push(Message::user(query));
        messages
    }
}

#[async_trait]
impl DialogueSystem for LlmResponder {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn process(&self, context: &Session, query: &str) -> Result<String> {
        let messages = self.build_messages(context, query);
        let reply = self.client.chat(&messages).await?;
        Ok(reply.trim().to_string())
    }
}
