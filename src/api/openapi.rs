//! OpenAPI documentation and schema generation

use utoipa::OpenApi;

/// OpenAPI documentation for the ytm-backend HTTP API
///
/// Served at `/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ytm-backend API",
        version = "0.1.0",
        description = "Metadata extraction, search and streamed downloads for the ytm-rs desktop client",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:55001", description = "Local backend")
    ),
    paths(
        crate::api::routes::identity,
        crate::api::routes::health_check,
        crate::api::routes::get_capabilities,
        crate::api::routes::openapi_spec,
        crate::api::routes::request_info,
        crate::api::routes::search,
        crate::api::routes::download,
    ),
    components(
        schemas(
            crate::types::DownloadRequest,
            crate::types::InfoRequest,
            crate::types::Capabilities,
            crate::types::JobState,
            crate::error::EngineError,
            crate::error::EngineErrorKind,
            crate::error::ApiError,
            crate::error::ErrorDetail,
        )
    ),
    tags(
        (name = "system", description = "Identity, health, capabilities and API docs"),
        (name = "media", description = "Metadata extraction and search"),
        (name = "download", description = "Streamed download jobs"),
    )
)]
pub struct ApiDoc;
