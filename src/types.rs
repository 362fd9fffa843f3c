//! Core types for ytm-backend

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identifier of a single download job
///
/// Scoped to one request/response pair; only used to correlate logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Create a new random JobId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request body for POST /download
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DownloadRequest {
    /// Media URL to extract and download
    #[serde(default)]
    pub url: String,

    /// Desired output audio format (e.g. "mp3"); unknown values are ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convert_to: Option<String>,
}

impl DownloadRequest {
    /// Request a download without conversion
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            convert_to: None,
        }
    }

    /// Request conversion to the given format token
    pub fn with_convert_to(mut self, convert_to: impl Into<String>) -> Self {
        self.convert_to = Some(convert_to.into());
        self
    }
}

/// Request body for POST /request_info
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InfoRequest {
    /// Media URL to inspect
    #[serde(default)]
    pub url: String,

    /// Resolve every playlist entry fully (default: true). When false,
    /// playlist entries are returned flat.
    #[serde(default = "default_process")]
    pub process: bool,
}

fn default_process() -> bool {
    true
}

/// Lifecycle of a job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted, options built
    Pending,
    /// Worker started, engine invoked
    Running,
    /// Engine returned a result
    Completed,
    /// Engine reported a failure
    Failed,
    /// Response side went away before the engine finished
    Cancelled,
}

impl JobState {
    /// Whether the job has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }
}

/// Event relayed from a job's worker to its response stream
///
/// Any number of `Status` events precede exactly one `Result` or `Error`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Download/transcode progress, passed through from the engine
    Status(serde_json::Value),
    /// Final metadata returned by the engine
    Result(serde_json::Value),
    /// The job failed
    Error(EngineError),
}

impl ProgressEvent {
    /// Whether this event ends a job's sequence
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Status(_))
    }
}

/// What the running service can do
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Name of the extraction engine implementation
    pub engine: String,
    /// Engine can extract metadata
    pub can_extract: bool,
    /// Engine can download and post-process media
    pub can_download: bool,
    /// Tokens accepted by `convert_to`
    pub supported_formats: Vec<String>,
}
