//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the repeat-fetch REST API
///
/// Served at `/api/openapi.json`, and to Swagger UI at `/swagger-ui` when
/// enabled.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "repeat-fetch REST API",
        version = "0.1.0",
        description = "Run sequential fetch batches against a URL and get a per-attempt report",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:3001", description = "Local server")
    ),
    paths(
        crate::api::routes::run_batch,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        crate::types::BatchInput,
        crate::types::BatchResponse,
        crate::types::BatchReport,
        crate::types::AttemptOutcome,
        crate::types::AttemptResult,
        crate::error::ApiError,
    )),
    tags(
        (name = "batch", description = "Batch execution"),
        (name = "system", description = "Health checks and API description"),
    )
)]
pub struct ApiDoc;
