use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Static single-page frontend.
///
/// Returns `None` when `dir` does not exist, so the API can run without a
/// built frontend. `/app` serves `index.html`; every other unmatched path is
/// looked up under `dir`.
pub fn routes<S>(dir: &Path) -> Option<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    if !dir.is_dir() {
        tracing::info!(path = %dir.display(), "Frontend directory not found, static files disabled");
        return None;
    }

    tracing::info!(path = %dir.display(), "Serving frontend");

    Some(
        Router::new()
            .route_service("/app", ServeFile::new(dir.join("index.html")))
            .fallback_service(ServeDir::new(dir)),
    )
}
