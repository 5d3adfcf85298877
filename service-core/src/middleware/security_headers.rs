use axum::{extract::Request, http::header, middleware::Next, response::IntoResponse};

/// Paths rendered by a browser (Swagger UI, the bundled frontend) get a
/// same-origin CSP; everything else is a JSON API and gets a locked-down one.
fn is_browser_page(path: &str) -> bool {
    path.starts_with("/docs")
        || path == "/.well-known/openapi.json"
        || path == "/app"
        || path
            .rsplit('/')
            .next()
            .is_some_and(|segment| segment.contains('.'))
}

pub async fn security_headers_middleware(req: Request, next: Next) -> impl IntoResponse {
    let browser_page = is_browser_page(req.uri().path());

    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        header::HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        header::HeaderValue::from_static("no-referrer"),
    );

    if browser_page {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static(
                "default-src 'self'; \
                 script-src 'self' 'unsafe-inline'; \
                 style-src 'self' 'unsafe-inline'; \
                 img-src 'self' data:; \
                 font-src 'self'; \
                 connect-src 'self'",
            ),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("SAMEORIGIN"),
        );
    } else {
        headers.insert(
            header::CONTENT_SECURITY_POLICY,
            header::HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        );
        headers.insert(
            header::X_FRAME_OPTIONS,
            header::HeaderValue::from_static("DENY"),
        );
    }

    response
}
