//! Extraction/download engines
//!
//! The job subsystem treats the engine as an opaque capability: given a URL
//! and [`JobOptions`], produce a metadata object, optionally materializing a
//! file on disk and reporting progress along the way.
//!
//! Implementations:
//! - [`YtDlpEngine`] drives the external `yt-dlp` binary
//! - [`NoOpEngine`] fails every call, used when no binary is available
//! - [`ScriptedEngine`] replays canned progress and results

use crate::error::EngineError;
use crate::options::JobOptions;
use async_trait::async_trait;
use std::sync::Arc;

mod args;
mod noop;
mod output;
mod scripted;
mod ytdlp;

pub use noop::NoOpEngine;
pub use scripted::{RecordedCall, ScriptedEngine};
pub use ytdlp::YtDlpEngine;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Callback receiving engine progress notifications
///
/// Cheap to clone; every clone forwards to the same sink.
#[derive(Clone)]
pub struct ProgressHook {
    inner: Arc<dyn Fn(serde_json::Value) + Send + Sync>,
}

impl ProgressHook {
    /// Wrap a callback
    pub fn new(callback: impl Fn(serde_json::Value) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(callback),
        }
    }

    /// A hook that discards every notification
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Forward one progress payload
    pub fn report(&self, payload: serde_json::Value) {
        (self.inner)(payload)
    }
}

impl std::fmt::Debug for ProgressHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressHook").finish_non_exhaustive()
    }
}

/// Capabilities of an engine implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineCapabilities {
    /// Can extract metadata without downloading
    pub can_extract: bool,
    /// Can download and post-process media
    pub can_download: bool,
}

/// Trait for extraction/download engines
///
/// # Examples
///
/// ```no_run
/// use ytm_backend::engine::{ExtractionEngine, ProgressHook, YtDlpEngine};
/// use ytm_backend::options::JobOptions;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
/// let hook = ProgressHook::new(|status| println!("{status}"));
///
/// let info = engine
///     .download("https://music.youtube.com/watch?v=xyz", &JobOptions::default(), hook)
///     .await?;
/// println!("downloaded {}", info["id"]);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Extract metadata for `url` without downloading media
    ///
    /// When `process` is false, playlist entries are returned unresolved.
    async fn extract_info(
        &self,
        url: &str,
        options: &JobOptions,
        process: bool,
    ) -> EngineResult<serde_json::Value>;

    /// Download `url`, run the post-processing chain and return the final metadata
    ///
    /// Every progress notification is passed to `progress` as it happens.
    async fn download(
        &self,
        url: &str,
        options: &JobOptions,
        progress: ProgressHook,
    ) -> EngineResult<serde_json::Value>;

    /// Query capabilities of this engine
    fn capabilities(&self) -> EngineCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
