//! Error types for ytm-backend
//!
//! This module provides:
//! - The crate-wide [`Error`] type used by the launcher and the HTTP layer
//! - [`EngineError`], a structured failure reported by an extraction engine
//! - HTTP status code mapping for API integration
//! - The JSON error body returned by the API

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for ytm-backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ytm-backend
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "engine.binary_path")
        key: Option<String>,
    },

    /// Request rejected before any job was started
    #[error("validation error: {message}")]
    Validation {
        /// What was wrong with the request
        message: String,
        /// The request field that failed validation
        field: Option<String>,
    },

    /// Extraction engine failure
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a validation failure on a named request field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }
}

/// Category of an extraction engine failure
///
/// Lets callers match on what went wrong instead of parsing free text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineErrorKind {
    /// The engine binary could not be located
    NotFound,
    /// The engine process could not be started
    Spawn,
    /// No extractor understands the URL
    UnsupportedUrl,
    /// The media exists but cannot be retrieved (private, removed, geo-blocked)
    Unavailable,
    /// Transport failure while fetching
    Network,
    /// Generic extraction failure
    Extraction,
    /// Post-processing (transcode, concat) failed
    Postprocess,
    /// The engine produced output that could not be interpreted
    InvalidOutput,
    /// The engine crashed or the worker itself failed
    Internal,
}

impl EngineErrorKind {
    /// Stable snake_case name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineErrorKind::NotFound => "not_found",
            EngineErrorKind::Spawn => "spawn",
            EngineErrorKind::UnsupportedUrl => "unsupported_url",
            EngineErrorKind::Unavailable => "unavailable",
            EngineErrorKind::Network => "network",
            EngineErrorKind::Extraction => "extraction",
            EngineErrorKind::Postprocess => "postprocess",
            EngineErrorKind::InvalidOutput => "invalid_output",
            EngineErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by an extraction engine
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize, ToSchema)]
#[error("{kind}: {message}")]
pub struct EngineError {
    /// Failure category
    pub kind: EngineErrorKind,
    /// Human-readable description
    pub message: String,
}

impl EngineError {
    /// Create a new engine error
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Generic extraction failure
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Extraction, message)
    }

    /// Worker or engine crashed
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(EngineErrorKind::Internal, message)
    }
}

/// API error response format
///
/// Returned by API endpoints that fail before producing a result.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "validation error: url must not be empty",
///     "details": { "field": "url" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error", "engine_unavailable")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation { .. } => 400,

            Error::Engine(e) => match e.kind {
                // The URL itself is the problem
                EngineErrorKind::UnsupportedUrl => 422,
                EngineErrorKind::Unavailable => 404,
                // Engine binary missing or unusable
                EngineErrorKind::NotFound | EngineErrorKind::Spawn => 503,
                EngineErrorKind::Internal => 500,
                // Upstream fetch or processing failed
                EngineErrorKind::Network
                | EngineErrorKind::Extraction
                | EngineErrorKind::Postprocess
                | EngineErrorKind::InvalidOutput => 502,
            },

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation { .. } => "validation_error",
            Error::Engine(e) => match e.kind {
                EngineErrorKind::NotFound => "engine_not_found",
                EngineErrorKind::Spawn => "engine_spawn_failed",
                EngineErrorKind::UnsupportedUrl => "unsupported_url",
                EngineErrorKind::Unavailable => "media_unavailable",
                EngineErrorKind::Network => "network_error",
                EngineErrorKind::Extraction => "extraction_failed",
                EngineErrorKind::Postprocess => "postprocess_failed",
                EngineErrorKind::InvalidOutput => "invalid_engine_output",
                EngineErrorKind::Internal => "engine_internal_error",
            },
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Validation {
                field: Some(field), ..
            } => Some(serde_json::json!({
                "field": field,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Engine(e) => Some(serde_json::json!({
                "kind": e.kind,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
