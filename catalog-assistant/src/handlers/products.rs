use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use service_core::error::AppError;
use service_core::observability::extract_request_id;

use crate::config::PRODUCTS_ENTITY;
use crate::models::{ListProductsQuery, PageWindow, ProductPage, SearchQuery, SearchResponse};
use crate::services::search_products as run_search;
use crate::AppState;

/// One page of products, proxied from the entity REST service.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 503, description = "Entity service unreachable or failed")
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ProductPage>, AppError> {
    let request_id = extract_request_id(&headers);
    let window = PageWindow::from(query);

    let products = state
        .entities
        .list(PRODUCTS_ENTITY, window, request_id.as_deref())
        .await
        .map_err(|e| state.entities.unavailable(&e))?;

    tracing::debug!(
        page = query.page,
        page_size = query.page_size,
        returned = products.len(),
        "Listed products"
    );

    Ok(Json(ProductPage {
        page: query.page,
        page_size: query.page_size,
        products,
    }))
}

/// Vector-similarity search through the catalog procedure.
#[utoipa::path(
    get,
    path = "/api/products/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching products", body = SearchResponse),
        (status = 400, description = "Missing query parameter"),
        (status = 500, description = "Search procedure reported an error")
    ),
    tag = "Products"
)]
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, AppError> {
    let results = run_search(state.catalog.as_ref(), &params.query).await?;

    tracing::info!(results = results.len(), "Catalog search completed");

    Ok(Json(SearchResponse {
        query: params.query,
        results,
    }))
}
