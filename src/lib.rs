//! # ytm-backend
//!
//! Local HTTP backend for the ytm-rs desktop music client.
//!
//! Wraps an extraction engine (yt-dlp) behind a small HTTP API: metadata
//! lookup, search, and downloads whose progress is streamed back to the
//! caller as newline-delimited JSON while the job runs in the background.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use ytm_backend::{Config, DownloadRequest, JobLauncher, YtDlpEngine};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let engine = Arc::new(YtDlpEngine::from_config(&config.engine).ok_or("yt-dlp not found")?);
//!     let launcher = JobLauncher::from_config(engine, &config);
//!
//!     let mut job = launcher.launch(
//!         DownloadRequest::new("https://music.youtube.com/watch?v=xyz").with_convert_to("mp3"),
//!     )?;
//!     while let Some(event) = job.next_event().await {
//!         println!("{}", serde_json::to_string(&event)?);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP API module
pub mod api;
/// Configuration types
pub mod config;
/// Extraction engines
pub mod engine;
/// Error types
pub mod error;
/// Download jobs
pub mod jobs;
/// Per-job engine options
pub mod options;
/// Conversion format selection
pub mod postprocessor;
/// NDJSON response streaming
pub mod streaming;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use engine::{ExtractionEngine, NoOpEngine, ProgressHook, ScriptedEngine, YtDlpEngine};
pub use error::{ApiError, EngineError, EngineErrorKind, Error, ErrorDetail, Result, ToHttpStatus};
pub use jobs::{JobLauncher, StreamHandle};
pub use options::JobOptions;
pub use types::{Capabilities, DownloadRequest, InfoRequest, JobId, JobState, ProgressEvent};

/// Resolve when the process is asked to stop
///
/// - **Unix:** SIGTERM or SIGINT; falls back to `ctrl_c` if neither handler
///   can be registered.
/// - **Windows/other:** Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Used as the graceful shutdown trigger of [`api::start_api_server`].
pub async fn shutdown_signal() {
    wait_for_signal().await;
    tracing::info!("shutdown requested");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    let sigterm = signal(SignalKind::terminate())
        .map_err(|e| tracing::warn!(error = %e, "could not register SIGTERM handler"))
        .ok();
    let sigint = signal(SignalKind::interrupt())
        .map_err(|e| tracing::warn!(error = %e, "could not register SIGINT handler"))
        .ok();

    match (sigterm, sigint) {
        (Some(mut sigterm), Some(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("received SIGTERM"),
                _ = sigint.recv() => tracing::info!("received SIGINT"),
            }
        }
        (Some(mut sigterm), None) => {
            sigterm.recv().await;
            tracing::info!("received SIGTERM");
        }
        (None, Some(mut sigint)) => {
            sigint.recv().await;
            tracing::info!("received SIGINT");
        }
        (None, None) => {
            tracing::error!("no signal handlers registered, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}
