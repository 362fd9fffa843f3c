//! Engine used when no extraction backend is available

use super::{EngineCapabilities, EngineResult, ExtractionEngine, ProgressHook};
use crate::error::{EngineError, EngineErrorKind};
use crate::options::JobOptions;
use async_trait::async_trait;

/// Engine that fails every call with [`EngineErrorKind::NotFound`]
///
/// Lets the service start and answer identity/health probes even when yt-dlp
/// is not installed; jobs then fail in-band with a clear message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEngine;

impl NoOpEngine {
    fn unavailable() -> EngineError {
        EngineError::new(
            EngineErrorKind::NotFound,
            "yt-dlp is not installed or not configured",
        )
    }
}

#[async_trait]
impl ExtractionEngine for NoOpEngine {
    async fn extract_info(
        &self,
        _url: &str,
        _options: &JobOptions,
        _process: bool,
    ) -> EngineResult<serde_json::Value> {
        Err(Self::unavailable())
    }

    async fn download(
        &self,
        _url: &str,
        _options: &JobOptions,
        _progress: ProgressHook,
    ) -> EngineResult<serde_json::Value> {
        Err(Self::unavailable())
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_extract: false,
            can_download: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
