use axum::{extract::State, Json};
use service_core::error::AppError;
use tracing::instrument;

use crate::models::{ChatRequest, ChatResponse, RecommendationSet, StructuredReply};
use crate::services::prompts::{assistant_instructions, conversation, recommendation_instructions};
use crate::services::grounding_for;
use crate::AppState;

/// Answer a shopper's question using catalog rows similar to it.
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant answer", body = ChatResponse),
        (status = 500, description = "Catalog search or model call failed")
    ),
    tag = "Chat"
)]
#[instrument(skip_all)]
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let grounding = grounding_for(state.catalog.as_ref(), &request.message).await?;

    let messages = conversation(assistant_instructions(grounding.text()), &request.message);
    let completion = state.chat.complete(&messages).await?;

    Ok(Json(ChatResponse {
        user_message: request.message,
        assistant_response: completion.content,
        products_found: grounding.products_found(),
    }))
}

/// Ask the model for JSON recommendations. Whatever comes back is returned:
/// parsed JSON as-is, anything else as `{rawResponse}`.
#[utoipa::path(
    post,
    path = "/api/chat/structured",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Model JSON, or the raw text under rawResponse", body = RecommendationSet),
        (status = 500, description = "Catalog search or model call failed")
    ),
    tag = "Chat"
)]
#[instrument(skip_all)]
pub async fn chat_structured(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<StructuredReply>, AppError> {
    let grounding = grounding_for(state.catalog.as_ref(), &request.message).await?;

    let messages = conversation(
        recommendation_instructions(grounding.text()),
        &request.message,
    );
    let completion = state.chat.complete(&messages).await?;

    let reply = StructuredReply::from_model_text(&completion.content);
    if !reply.is_parsed() {
        tracing::info!("Structured chat reply was not JSON, returning raw text");
    }

    Ok(Json(reply))
}
