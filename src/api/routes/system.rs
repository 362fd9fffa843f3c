//! System handlers: identity, health, capabilities, OpenAPI.

use crate::api::AppState;
use crate::error::ApiError;
use crate::postprocessor;
use crate::types::Capabilities;
use axum::{
    Json,
    extract::State,
    http::{StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::json;

/// Body returned by `GET /`
pub const IDENTITY: &str = "YTM_RS_BACKEND";

/// GET / - Identity probe
///
/// Lets the desktop client detect that the process on the port is this backend.
#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Backend identity string", body = String, content_type = "text/plain")
    )
)]
pub async fn identity() -> &'static str {
    IDENTITY
}

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /capabilities - Engine capabilities and accepted conversion formats
///
/// The format list is informational. Conversion is requested per download
/// through `convert_to` on `POST /download`, and unknown targets are
/// ignored there rather than rejected.
#[utoipa::path(
    get,
    path = "/capabilities",
    tag = "system",
    responses(
        (status = 200, description = "Current capabilities", body = Capabilities)
    )
)]
pub async fn get_capabilities(State(state): State<AppState>) -> impl IntoResponse {
    let engine = state.launcher.engine();
    let caps = engine.capabilities();

    let capabilities = Capabilities {
        engine: engine.name().to_string(),
        can_extract: caps.can_extract,
        can_download: caps.can_download,
        supported_formats: postprocessor::supported_formats()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    (StatusCode::OK, Json(capabilities))
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new("not_found", format!("no route for {}", uri.path()))),
    )
}
