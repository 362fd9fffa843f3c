//! Engine that replays a fixed script

use super::{EngineCapabilities, EngineResult, ExtractionEngine, ProgressHook};
use crate::error::EngineError;
use crate::options::JobOptions;
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Outcome {
    Succeed(serde_json::Value),
    Fail(EngineError),
    #[cfg(test)]
    Panic(String),
}

/// A recorded engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// URL passed to the engine
    pub url: String,
    /// Options passed to the engine
    pub options: JobOptions,
    /// `Some(process)` for metadata calls, `None` for downloads
    pub process: Option<bool>,
}

/// Engine that reports canned progress payloads and then a canned outcome
///
/// Useful for embedding tests and for exercising the job subsystem without
/// network access.
///
/// # Examples
///
/// ```
/// use ytm_backend::engine::{ExtractionEngine, ProgressHook, ScriptedEngine};
/// use ytm_backend::options::JobOptions;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let engine = ScriptedEngine::succeeding(json!({"id": "abc"}))
///     .with_progress(vec![json!({"status": "downloading"})]);
///
/// let result = engine
///     .download("https://example.test/track", &JobOptions::default(), ProgressHook::noop())
///     .await
///     .unwrap();
/// assert_eq!(result["id"], "abc");
/// assert_eq!(engine.calls().len(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct ScriptedEngine {
    progress: Vec<serde_json::Value>,
    outcome: Outcome,
    info: Option<serde_json::Value>,
    step_delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    finished: AtomicUsize,
}

impl ScriptedEngine {
    fn with_outcome(outcome: Outcome) -> Self {
        Self {
            progress: Vec::new(),
            outcome,
            info: None,
            step_delay: None,
            calls: Mutex::new(Vec::new()),
            finished: AtomicUsize::new(0),
        }
    }

    /// Engine whose downloads return `result`
    pub fn succeeding(result: serde_json::Value) -> Self {
        Self::with_outcome(Outcome::Succeed(result))
    }

    /// Engine whose downloads fail with `error`
    pub fn failing(error: EngineError) -> Self {
        Self::with_outcome(Outcome::Fail(error))
    }

    /// Engine whose downloads panic with `message`
    ///
    /// Test builds only; exercises the launcher's panic containment.
    #[cfg(test)]
    pub fn panicking(message: impl Into<String>) -> Self {
        Self::with_outcome(Outcome::Panic(message.into()))
    }

    /// Progress payloads reported before the outcome, in order
    pub fn with_progress(mut self, progress: Vec<serde_json::Value>) -> Self {
        self.progress = progress;
        self
    }

    /// Sleep before each progress payload and before the outcome
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    /// Value returned by metadata calls (defaults to the download outcome)
    pub fn with_info(mut self, info: serde_json::Value) -> Self {
        self.info = Some(info);
        self
    }

    /// Every invocation so far, in call order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of downloads that ran to their outcome
    pub fn finished_downloads(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    fn record(&self, url: &str, options: &JobOptions, process: Option<bool>) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedCall {
                url: url.to_string(),
                options: options.clone(),
                process,
            });
    }

    async fn pause(&self) {
        if let Some(delay) = self.step_delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn resolve(&self, outcome: &Outcome) -> EngineResult<serde_json::Value> {
        match outcome {
            Outcome::Succeed(value) => Ok(value.clone()),
            Outcome::Fail(error) => Err(error.clone()),
            #[cfg(test)]
            Outcome::Panic(message) => panic!("{message}"),
        }
    }
}

#[async_trait]
impl ExtractionEngine for ScriptedEngine {
    async fn extract_info(
        &self,
        url: &str,
        options: &JobOptions,
        process: bool,
    ) -> EngineResult<serde_json::Value> {
        self.record(url, options, Some(process));
        self.pause().await;

        match &self.info {
            Some(info) => Ok(info.clone()),
            None => self.resolve(&self.outcome),
        }
    }

    async fn download(
        &self,
        url: &str,
        options: &JobOptions,
        progress: ProgressHook,
    ) -> EngineResult<serde_json::Value> {
        self.record(url, options, None);

        for payload in &self.progress {
            self.pause().await;
            progress.report(payload.clone());
        }
        self.pause().await;

        self.finished.fetch_add(1, Ordering::SeqCst);
        self.resolve(&self.outcome)
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_extract: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
