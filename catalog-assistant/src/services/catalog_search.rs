//! Vector-similarity search over the product catalog.
//!
//! Ranking lives entirely in the database: a stored procedure takes the
//! search text and hands back two outputs, a JSON array of matching products
//! and an error message. This module calls it and interprets those outputs.
//!
//! Expected procedure signature (PostgreSQL):
//!
//! ```sql
//! CREATE PROCEDURE get_similar_items(
//!     input_text text,
//!     INOUT result text,
//!     INOUT error text
//! )
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde_json::{Map, Value};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

use crate::services::metrics::record_backend_call;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The procedure reported a failure through its error output.
    #[error("Search error: {0}")]
    Procedure(String),

    #[error("Search returned malformed results: {0}")]
    MalformedResult(#[source] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            other => AppError::InternalError(anyhow::anyhow!(other.to_string())),
        }
    }
}

/// Raw outputs of one procedure call. Both are `None` when no row came back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcedureOutput {
    pub result: Option<String>,
    pub error: Option<String>,
}

impl ProcedureOutput {
    /// Results for the search route.
    ///
    /// A non-empty error output always wins, even if a result was produced.
    /// An absent or empty result is an empty list, not an error.
    pub fn into_results(self) -> Result<Vec<Map<String, Value>>, SearchError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(SearchError::Procedure(error));
        }

        match self.result.filter(|r| !r.trim().is_empty()) {
            Some(json) => serde_json::from_str(&json).map_err(SearchError::MalformedResult),
            None => Ok(Vec::new()),
        }
    }

    /// Grounding text for the chat routes: the result JSON verbatim, or empty.
    /// The error output is not consulted here.
    pub fn into_grounding(self) -> Grounding {
        Grounding(
            self.result
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_default(),
        )
    }
}

/// Catalog data inserted into the model's instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grounding(String);

impl Grounding {
    pub fn text(&self) -> &str {
        &self.0
    }

    pub fn products_found(&self) -> bool {
        !self.0.is_empty()
    }
}

#[async_trait]
pub trait CatalogSearch: Send + Sync {
    /// Run the similarity procedure once for `search_text`.
    async fn similar_items(&self, search_text: &str) -> Result<ProcedureOutput, SearchError>;

    async fn health_check(&self) -> Result<(), SearchError>;
}

/// Search the catalog and return the parsed product rows.
pub async fn search_products(
    catalog: &dyn CatalogSearch,
    query: &str,
) -> Result<Vec<Map<String, Value>>, SearchError> {
    let outcome = catalog.similar_items(query).await.and_then(ProcedureOutput::into_results);
    record_backend_call("database", if outcome.is_ok() { "ok" } else { "error" });
    outcome
}

/// Search the catalog for chat grounding.
pub async fn grounding_for(
    catalog: &dyn CatalogSearch,
    message: &str,
) -> Result<Grounding, SearchError> {
    let output = catalog.similar_items(message).await.inspect_err(|_| {
        record_backend_call("database", "error");
    })?;

    if let Some(error) = output.error.as_deref().filter(|e| !e.is_empty()) {
        tracing::warn!(error = %error, "Similarity procedure reported an error during grounding");
    }

    record_backend_call("database", "ok");
    Ok(output.into_grounding())
}

/// Output columns of the similarity procedure.
const RESULT_COLUMN: &str = "result";
const ERROR_COLUMN: &str = "error";

/// `CALL` statement for `procedure`: the search text is bound as `$1`, the
/// two INOUT parameters are passed as NULL and come back as one row.
fn call_statement(procedure: &str) -> String {
    format!("CALL {}($1, NULL, NULL)", procedure)
}

/// [`CatalogSearch`] backed by a PostgreSQL stored procedure.
pub struct PgCatalogSearch {
    pool: PgPool,
    call_sql: String,
}

impl PgCatalogSearch {
    /// Create a lazily connecting pool; no connection is opened until the
    /// first search, so a database outage does not prevent startup.
    pub fn connect_lazy(
        connection_string: &Secret<String>,
        procedure: &str,
        max_connections: u32,
    ) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect_lazy(connection_string.expose_secret())
            .map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid database connection string: {}", e))
            })?;

        Ok(Self {
            pool,
            // Validated as a plain identifier when the config was loaded.
            call_sql: call_statement(procedure),
        })
    }
}

#[async_trait]
impl CatalogSearch for PgCatalogSearch {
    #[instrument(skip(self, search_text), fields(search_len = search_text.len()))]
    async fn similar_items(&self, search_text: &str) -> Result<ProcedureOutput, SearchError> {
        // Connection goes back to the pool when `conn` drops at the end of this call.
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query(&self.call_sql)
            .bind(search_text)
            .fetch_optional(&mut *conn)
            .await?;

        let output = match row {
            Some(row) => ProcedureOutput {
                result: row.try_get(RESULT_COLUMN)?,
                error: row.try_get(ERROR_COLUMN)?,
            },
            None => ProcedureOutput::default(),
        };

        tracing::debug!(
            has_result = output.result.is_some(),
            has_error = output.error.is_some(),
            "Similarity procedure returned"
        );

        Ok(output)
    }

    async fn health_check(&self) -> Result<(), SearchError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
