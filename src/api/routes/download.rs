//! Download handler: starts a job and streams its events as NDJSON.

use crate::api::AppState;
use crate::error::Result;
use crate::streaming::NdjsonResponse;
use crate::types::DownloadRequest;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

/// POST /download - Download media and stream progress
///
/// Responds immediately with a chunked `application/x-ndjson` body: zero or
/// more `status` lines followed by exactly one `result` or `error` line.
/// Engine failures are reported in-band; only request validation fails with
/// an HTTP error status.
#[utoipa::path(
    post,
    path = "/download",
    tag = "download",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "Progress stream, one JSON event per line", body = String, content_type = "application/x-ndjson"),
        (status = 400, description = "Invalid request", body = crate::error::ApiError)
    )
)]
pub async fn download(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<NdjsonResponse> {
    let Json(request) = payload?;
    let handle = state.launcher.launch(request)?;

    tracing::info!(job_id = %handle.id(), "download stream opened");

    Ok(NdjsonResponse(handle))
}
