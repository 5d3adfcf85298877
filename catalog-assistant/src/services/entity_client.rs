//! Client for the generated entity REST layer (Data API builder).

use reqwest::{Client, StatusCode};
use serde_json::Value;
use service_core::error::AppError;
use service_core::observability::TracedClientExt;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

use crate::config::EntityServiceConfig;
use crate::models::PageWindow;
use crate::services::metrics::record_backend_call;

#[derive(Debug, Error)]
pub enum EntityClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("entity service responded with status {0}")]
    Status(StatusCode),

    #[error("entity service returned an unreadable body: {0}")]
    Decode(String),
}

#[derive(Clone)]
pub struct EntityClient {
    client: Client,
    base_url: String,
}

impl EntityClient {
    pub fn new(config: &EntityServiceConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one window of `entity` rows: `GET /api/{entity}?$first=..&$after=..`.
    ///
    /// Returns the array under the response's `value` key; a response without
    /// one yields no rows.
    #[instrument(skip(self, request_id), fields(first = window.first, after = window.after))]
    pub async fn list(
        &self,
        entity: &str,
        window: PageWindow,
        request_id: Option<&str>,
    ) -> Result<Vec<Value>, EntityClientError> {
        let url = format!("{}/api/{}", self.base_url, entity);

        let result = self.fetch(&url, window, request_id).await;
        record_backend_call("entity_service", if result.is_ok() { "ok" } else { "error" });
        result
    }

    async fn fetch(
        &self,
        url: &str,
        window: PageWindow,
        request_id: Option<&str>,
    ) -> Result<Vec<Value>, EntityClientError> {
        let response = self
            .client
            .traced_get(url)
            .query(&[("$first", window.first), ("$after", window.after)])
            .request_id(request_id)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url = %url, "Entity service returned an error status");
            return Err(EntityClientError::Status(status));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EntityClientError::Decode(e.to_string()))?;

        Ok(match body {
            Value::Object(mut map) => match map.remove("value") {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        })
    }

    /// Map a failed listing to the user-facing problem: the usual cause is
    /// that the REST layer is simply not running.
    pub fn unavailable(&self, err: &EntityClientError) -> AppError {
        AppError::ServiceUnavailable(format!(
            "Error connecting to DAB: {}. Make sure DAB is running on {}.",
            err, self.base_url
        ))
    }
}
