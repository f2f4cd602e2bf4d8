//! REST API server module
//!
//! Exposes the batch runner over HTTP, plus health, OpenAPI and a browser form.

use crate::{BatchRunner, Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod batch_limit;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `POST /api/proxy` - Run a batch (other methods: 405, OPTIONS: 200);
///   capped per client IP when `server.batch_limit` is enabled
/// - `GET /health` - Health check
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Swagger UI (if enabled)
/// - `GET /` - Browser form (if enabled)
pub fn create_router(runner: Arc<BatchRunner>, config: Arc<Config>) -> Router {
    let state = AppState::new(runner, config.clone());
    let api = &config.server;

    let batch_route = post(routes::run_batch).fallback(routes::method_not_allowed);
    // route_layer: only POST counts against the cap, not 405/OPTIONS
    let batch_route = if api.batch_limit.enabled {
        let limiter = Arc::new(batch_limit::BatchLimiter::new(api.batch_limit.clone()));
        batch_route.route_layer(middleware::from_fn_with_state(
            limiter,
            batch_limit::batch_limit_middleware,
        ))
    } else {
        batch_route
    };

    let router = Router::new()
        .route("/api/proxy", batch_route)
        .route("/health", get(routes::health_check))
        .route("/api/openapi.json", get(routes::openapi_spec));

    let router = if api.ui_enabled {
        router.route("/", get(routes::index))
    } else {
        router
    };

    // Swagger UI serves its own copy of the document under a separate path
    let router = if api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if api.cors_enabled {
        router.layer(build_cors_layer(&api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin. Methods and headers are always
/// unrestricted.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address
///
/// Runs until `shutdown` resolves. In-flight batches are allowed to finish
/// before this returns.
///
/// # Example
///
/// ```no_run
/// use repeat_fetch::{BatchRunner, Config, HttpFetcher, TitleExtractor};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let runner = Arc::new(BatchRunner::new(
///     Arc::new(HttpFetcher::new()?),
///     Arc::new(TitleExtractor),
///     config.runner.clone(),
/// ));
///
/// repeat_fetch::api::start_api_server(runner, config, repeat_fetch::shutdown_signal()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(
    runner: Arc<BatchRunner>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(runner, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    // ConnectInfo is required by the batch limit middleware
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
