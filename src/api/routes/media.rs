//! Metadata handlers: request_info and search.

use crate::api::AppState;
use crate::error::{Error, Result};
use crate::jobs::validate_url;
use crate::types::InfoRequest;
use axum::{
    Json,
    extract::{RawQuery, State, rejection::JsonRejection},
};
use url::Url;

/// Page the search query is forwarded to
pub const SEARCH_BASE_URL: &str = "https://music.youtube.com/search";

/// Merge a raw query string into [`SEARCH_BASE_URL`]
///
/// Parameters keep their first-seen position; a repeated key takes its last
/// value. An empty query is rejected.
pub fn build_search_url(raw_query: &str) -> Result<Url> {
    let mut params: Vec<(String, String)> = Vec::new();
    for (key, value) in url::form_urlencoded::parse(raw_query.as_bytes()) {
        match params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value.into_owned(),
            None => params.push((key.into_owned(), value.into_owned())),
        }
    }

    if params.is_empty() {
        return Err(Error::validation("query", "search query is required"));
    }

    let mut url = Url::parse(SEARCH_BASE_URL).map_err(|e| Error::Other(e.to_string()))?;
    url.query_pairs_mut().extend_pairs(params);
    Ok(url)
}

/// POST /request_info - Extract metadata without downloading
#[utoipa::path(
    post,
    path = "/request_info",
    tag = "media",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Metadata reported by the engine"),
        (status = 400, description = "Invalid request", body = crate::error::ApiError),
        (status = 502, description = "Extraction failed", body = crate::error::ApiError),
        (status = 503, description = "Engine not available", body = crate::error::ApiError)
    )
)]
pub async fn request_info(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>> {
    let Json(request) = payload?;
    let url = validate_url(&request.url)?;

    tracing::debug!(url = %url, process = request.process, "extracting metadata");

    let info = state
        .launcher
        .engine()
        .extract_info(url.as_str(), state.launcher.base_options(), request.process)
        .await?;

    Ok(Json(info))
}

/// GET /search - Search music.youtube.com
///
/// The query string is forwarded as is; results are extracted flat.
#[utoipa::path(
    get,
    path = "/search",
    tag = "media",
    params(
        ("q" = Option<String>, Query, description = "Search terms; every parameter is forwarded")
    ),
    responses(
        (status = 200, description = "Flat search results reported by the engine"),
        (status = 400, description = "Missing query", body = crate::error::ApiError),
        (status = 502, description = "Extraction failed", body = crate::error::ApiError),
        (status = 503, description = "Engine not available", body = crate::error::ApiError)
    )
)]
pub async fn search(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<serde_json::Value>> {
    let url = build_search_url(query.as_deref().unwrap_or_default())?;

    tracing::debug!(url = %url, "searching");

    let info = state
        .launcher
        .engine()
        .extract_info(url.as_str(), state.launcher.base_options(), false)
        .await?;

    Ok(Json(info))
}
