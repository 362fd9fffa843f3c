//! HTTP API server module
//!
//! Serves metadata extraction, search and streamed downloads to the desktop
//! client.

use crate::jobs::JobLauncher;
use crate::{Config, Result};
use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

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
/// ## System
/// - `GET /` - Identity probe (`YTM_RS_BACKEND`)
/// - `GET /health` - Health check
/// - `GET /capabilities` - Engine capabilities and conversion formats
/// - `GET /openapi.json` - OpenAPI specification
///
/// ## Media
/// - `POST /request_info` - Extract metadata for a URL
/// - `GET /search` - Search music.youtube.com
///
/// ## Download
/// - `POST /download` - Download and stream NDJSON progress
pub fn create_router(launcher: Arc<JobLauncher>, config: Arc<Config>) -> Router {
    let state = AppState::new(launcher, config.clone());

    let router = Router::new()
        // System
        .route("/", get(routes::identity))
        .route("/health", get(routes::health_check))
        .route("/capabilities", get(routes::get_capabilities))
        .route("/openapi.json", get(routes::openapi_spec))
        // Media
        .route("/request_info", post(routes::request_info))
        .route("/search", get(routes::search))
        // Download
        .route("/download", post(routes::download))
        .fallback(routes::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        router.layer(build_cors_layer(&config.server.api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin.
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

/// Start the API server on the configured bind address.
///
/// Runs until the server fails or the process receives SIGINT/SIGTERM.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use ytm_backend::{Config, JobLauncher, NoOpEngine};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let launcher = Arc::new(JobLauncher::from_config(Arc::new(NoOpEngine), &config));
///
/// ytm_backend::api::start_api_server(launcher, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(launcher: Arc<JobLauncher>, config: Arc<Config>) -> Result<()> {
    serve_until(launcher, config, crate::shutdown_signal()).await
}

/// Start the API server and stop gracefully when `shutdown` resolves
///
/// Open download streams are allowed to finish before the call returns.
pub async fn serve_until<F>(
    launcher: Arc<JobLauncher>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "starting API server");

    let app = create_router(launcher, config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %listener.local_addr().unwrap_or(bind_address),
        "API server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
