//! Batch execution handlers.

use crate::api::AppState;
use crate::error::Error;
use crate::types::{BatchInput, BatchResponse};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

/// POST /api/proxy - Run a fetch batch
///
/// Blocks until every attempt has finished, then answers with the full
/// report. Individual fetch failures appear in `results`; only an unusable
/// payload yields an error response.
#[utoipa::path(
    post,
    path = "/api/proxy",
    tag = "batch",
    request_body(content = BatchInput, description = "Target URL, attempt count and base delay"),
    responses(
        (status = 200, description = "Batch completed", body = BatchResponse),
        (status = 400, description = "Missing or invalid URL, or malformed payload", body = crate::error::ApiError),
        (status = 429, description = "Too many batches from this client", body = crate::error::ApiError),
        (status = 500, description = "Internal server error", body = crate::error::ApiError)
    )
)]
pub async fn run_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchInput>, JsonRejection>,
) -> Result<Json<BatchResponse>, Error> {
    let Json(input) = payload?;
    let request = input.validate(&state.config.limits)?;
    let report = state.runner.run(&request).await?;
    Ok(Json(report.into()))
}

/// Any other method on /api/proxy
///
/// OPTIONS gets an empty 200 so preflights succeed even with CORS disabled.
pub async fn method_not_allowed(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        Error::MethodNotAllowed.into_response()
    }
}
