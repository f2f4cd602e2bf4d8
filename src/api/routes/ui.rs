//! Browser form served at `/`.

use axum::response::{Html, IntoResponse};

const INDEX_HTML: &str = include_str!("../static/index.html");

/// GET / - Single-page form that posts to /api/proxy
pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}
