//! Azure OpenAI chat-completions provider.

use super::{ChatCompletion, ChatMessage, ChatProvider, FinishReason, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::time::Duration;

use crate::config::ModelConfig;
use crate::services::metrics::record_backend_call;

#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint (`https://<name>.openai.azure.com`) or a full
    /// `.../chat/completions` URL.
    pub endpoint: String,
    pub api_key: Secret<String>,
    pub deployment: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl From<&ModelConfig> for AzureOpenAiConfig {
    fn from(config: &ModelConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            deployment: config.deployment.clone(),
            api_version: config.api_version.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }
}

pub struct AzureOpenAiProvider {
    config: AzureOpenAiConfig,
    client: Client,
    url: String,
}

impl AzureOpenAiProvider {
    pub fn new(config: AzureOpenAiConfig) -> Result<Self, ProviderError> {
        if config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured("missing API key".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        let url = completions_url(&config);
        Ok(Self {
            config,
            client,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ProviderError> {
        let request = CompletionRequest {
            model: &self.config.deployment,
            messages,
        };

        let response = self
            .client
            .traced_post(&self.url)
            .header("api-key", self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Azure OpenAI error {}: {}",
                status, error_text
            )));
        }

        let api_response: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::ApiError("Response contained no choices".to_string()))?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("stop") | None => FinishReason::Complete,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            Some(_) => FinishReason::Other,
        };

        if finish_reason == FinishReason::ContentFilter {
            return Err(ProviderError::ContentFiltered);
        }

        let usage = api_response.usage.unwrap_or_default();

        Ok(ChatCompletion {
            content: choice.message.content.unwrap_or_default(),
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            finish_reason,
        })
    }
}

/// `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version=..`,
/// unless the endpoint already points at a completions URL.
fn completions_url(config: &AzureOpenAiConfig) -> String {
    let endpoint = config.endpoint.trim_end_matches('/');
    let path_end = endpoint.split('?').next().unwrap_or(endpoint);

    if path_end.ends_with("/chat/completions") {
        endpoint.to_string()
    } else {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            endpoint, config.deployment, config.api_version
        )
    }
}

#[async_trait]
impl ChatProvider for AzureOpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, ProviderError> {
        tracing::debug!(
            deployment = %self.config.deployment,
            message_count = messages.len(),
            "Sending request to Azure OpenAI"
        );

        let result = self.send(messages).await;

        match &result {
            Ok(completion) => {
                record_backend_call("chat_model", "ok");
                tracing::info!(
                    deployment = %self.config.deployment,
                    prompt_tokens = completion.prompt_tokens,
                    completion_tokens = completion.completion_tokens,
                    finish_reason = ?completion.finish_reason,
                    "Chat completion received"
                );
            }
            Err(e) => {
                record_backend_call("chat_model", "error");
                tracing::error!(deployment = %self.config.deployment, error = %e, "Chat completion failed");
            }
        }

        result
    }

    fn model(&self) -> &str {
        &self.config.deployment
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> AzureOpenAiConfig {
        AzureOpenAiConfig {
            endpoint: endpoint.to_string(),
            api_key: Secret::new("key".to_string()),
            deployment: "gpt-5-mini".to_string(),
            api_version: "2024-10-21".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn builds_deployment_url_from_resource_endpoint() {
        assert_eq!(
            completions_url(&config("https://contoso.openai.azure.com/")),
            "https://contoso.openai.azure.com/openai/deployments/gpt-5-mini/chat/completions?api-version=2024-10-21"
        );
    }

    #[test]
    fn keeps_full_completions_url() {
        let url = "https://contoso.services.ai.azure.com/models/chat/completions?api-version=2024-05-01-preview";
        assert_eq!(completions_url(&config(url)), url);
    }

    #[test]
    fn rejects_empty_api_key() {
        let mut cfg = config("https://contoso.openai.azure.com");
        cfg.api_key = Secret::new(String::new());
        assert!(matches!(
            AzureOpenAiProvider::new(cfg),
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
