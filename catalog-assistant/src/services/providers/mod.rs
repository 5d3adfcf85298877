//! Chat-completion providers.
//!
//! Handlers talk to the model through [`ChatProvider`], so the hosted
//! Azure OpenAI deployment can be swapped for the mock in tests.

pub mod azure_openai;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Problem detail shown to callers when the model call fails. The provider's
/// own message can echo upstream response bodies, so it is only logged.
pub const CHAT_FAILURE_DETAIL: &str = "Chat completion failed";

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        tracing::error!(error = %err, "{}", CHAT_FAILURE_DETAIL);
        AppError::InternalError(anyhow::anyhow!(CHAT_FAILURE_DETAIL))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Reason why generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    Length,
    ContentFilter,
    Other,
}

/// One assistant turn.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    /// Assistant text; empty when the model returned no content.
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub finish_reason: FinishReason,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Send a full conversation and wait for a single completion.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ProviderError>;

    /// Model or deployment name, for logs.
    fn model(&self) -> &str;
}
