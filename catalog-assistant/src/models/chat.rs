use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ChatRequest {
    #[schema(example = "I need a waterproof jacket for hiking")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub user_message: String,
    pub assistant_response: String,
    /// True when the catalog search produced grounding data.
    pub products_found: bool,
}

/// Reply of the structured chat route.
///
/// The model is asked for a [`RecommendationSet`], but its output is only
/// ever trusted as far as it parses: valid JSON is passed through untouched,
/// anything else comes back wrapped as [`RawReply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredReply {
    Parsed(Value),
    Raw(RawReply),
}

impl StructuredReply {
    pub fn from_model_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => StructuredReply::Parsed(value),
            Err(e) => {
                tracing::debug!(error = %e, "Model output is not JSON, returning raw text");
                StructuredReply::Raw(RawReply {
                    raw_response: text.to_string(),
                })
            }
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, StructuredReply::Parsed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawReply {
    pub raw_response: String,
}

/// Shape the structured route asks the model to produce. Documentation only;
/// replies are not validated against it.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecommendationSet {
    pub recommendations: Vec<Recommendation>,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub product_name: String,
    pub reason: String,
    #[schema(example = "high")]
    pub confidence: String,
}
