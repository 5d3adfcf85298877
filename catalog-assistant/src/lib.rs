pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AssistantConfig, Environment};
use crate::services::{CatalogSearch, ChatProvider, EntityClient};

pub use startup::Application;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root_status,
        handlers::health_check,
        handlers::readiness_check,
        handlers::products::list_products,
        handlers::products::search_products,
        handlers::chat::chat,
        handlers::chat::chat_structured,
    ),
    components(schemas(
        models::ProductPage,
        models::SearchResponse,
        models::ChatRequest,
        models::ChatResponse,
        models::RecommendationSet,
        models::Recommendation,
        models::RawReply,
    )),
    tags(
        (name = "Products", description = "Catalog listing and similarity search"),
        (name = "Chat", description = "Catalog-grounded assistant"),
        (name = "Observability", description = "Service health and monitoring"),
    )
)]
pub struct ApiDoc;

/// Shared, read-only handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AssistantConfig>,
    pub catalog: Arc<dyn CatalogSearch>,
    pub entities: EntityClient,
    pub chat: Arc<dyn ChatProvider>,
}

pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(handlers::root_status))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route("/api/products", get(handlers::products::list_products))
        .route(
            "/api/products/search",
            get(handlers::products::search_products),
        )
        .route("/api/chat", post(handlers::chat::chat))
        .route("/api/chat/structured", post(handlers::chat::chat_structured));

    if state.config.environment == Environment::Dev {
        app = app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    if let Some(frontend) = handlers::frontend::routes(&state.config.frontend_dir) {
        app = app.merge(frontend);
    }

    let cors = cors_layer(&state.config.allowed_origins);

    app.with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Invalid CORS origin '{}': {}. Skipping.", origin, e);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
