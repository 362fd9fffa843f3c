//! NDJSON response streaming
//!
//! Turns a job's event sequence into a chunked HTTP body with one JSON
//! document per line. Each event is written as soon as the worker produces it.

use crate::jobs::StreamHandle;
use crate::types::ProgressEvent;
use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;

/// Media type of the streamed body
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Header carrying the job identifier
pub const JOB_ID_HEADER: &str = "x-job-id";

/// Encode one event as a single NDJSON line
pub fn encode_event(event: &ProgressEvent) -> Bytes {
    match serde_json::to_vec(event) {
        Ok(mut line) => {
            line.push(b'\n');
            Bytes::from(line)
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to serialize progress event");
            let fallback = serde_json::json!({
                "type": "error",
                "data": {"kind": "internal", "message": format!("unserializable event: {e}")},
            });
            Bytes::from(format!("{fallback}\n"))
        }
    }
}

/// Stream of encoded lines for a job
///
/// Ends after the job's terminal event. The stream owns the handle, so
/// dropping the stream (client gone) drops the handle too.
pub fn ndjson_stream(
    handle: StreamHandle,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    futures::stream::unfold(handle, |mut handle| async move {
        let event = handle.next_event().await?;
        Some((Ok(encode_event(&event)), handle))
    })
}

/// Streaming NDJSON response for a launched job
#[derive(Debug)]
pub struct NdjsonResponse(pub StreamHandle);

impl IntoResponse for NdjsonResponse {
    fn into_response(self) -> Response {
        let id = self.0.id().to_string();
        let mut response = Body::from_stream(ndjson_stream(self.0)).into_response();

        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(NDJSON_CONTENT_TYPE),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        if let Ok(value) = HeaderValue::from_str(&id) {
            headers.insert(JOB_ID_HEADER, value);
        }

        response
    }
}
