//! Mock provider implementation for testing.

use super::{ChatCompletion, ChatMessage, ChatProvider, FinishReason, ProviderError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Replies with a canned answer and remembers every conversation it was sent.
pub struct MockChatProvider {
    reply: Result<String, String>,
    received: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChatProvider {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.received
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ProviderError> {
        if let Ok(mut received) = self.received.lock() {
            received.push(messages.to_vec());
        }

        match &self.reply {
            Ok(content) => Ok(ChatCompletion {
                content: content.clone(),
                prompt_tokens: messages.iter().map(|m| m.content.len() as u32 / 4).sum(),
                completion_tokens: content.len() as u32 / 4,
                finish_reason: FinishReason::Complete,
            }),
            Err(message) => Err(ProviderError::ApiError(message.clone())),
        }
    }

    fn model(&self) -> &str {
        "mock"
    }
}
