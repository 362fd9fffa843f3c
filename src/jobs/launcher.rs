//! Job launching and the background worker

use super::channel::{ProgressReceiver, ProgressSender, progress_channel};
use crate::config::Config;
use crate::engine::{ExtractionEngine, ProgressHook};
use crate::error::{EngineError, Error, Result};
use crate::options::JobOptions;
use crate::types::{DownloadRequest, JobId, JobState, ProgressEvent};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, warn};
use url::Url;

/// Check that `raw` is a usable media URL
///
/// The URL must be non-empty after trimming, parse, and use http or https.
pub fn validate_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::validation("url", "url is required"));
    }

    let url = Url::parse(raw)
        .map_err(|e| Error::validation("url", format!("url is not valid: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::validation(
            "url",
            format!("unsupported url scheme '{scheme}'"),
        )),
    }
}

/// Starts download jobs against an extraction engine
///
/// Holds the read-only state shared by every job: the engine and the base
/// options. Each launch gets its own options copy, channel and worker task.
pub struct JobLauncher {
    engine: Arc<dyn ExtractionEngine>,
    base: Arc<JobOptions>,
    cancel_on_disconnect: bool,
}

impl JobLauncher {
    /// Create a launcher with the given base options
    pub fn new(engine: Arc<dyn ExtractionEngine>, base: JobOptions) -> Self {
        Self {
            engine,
            base: Arc::new(base),
            cancel_on_disconnect: true,
        }
    }

    /// Create a launcher from service configuration
    pub fn from_config(engine: Arc<dyn ExtractionEngine>, config: &Config) -> Self {
        Self::new(engine, config.engine.base.clone())
            .with_cancel_on_disconnect(config.jobs.cancel_on_disconnect)
    }

    /// Whether dropping a job's [`StreamHandle`] stops its worker
    pub fn with_cancel_on_disconnect(mut self, enabled: bool) -> Self {
        self.cancel_on_disconnect = enabled;
        self
    }

    /// The engine jobs run against
    pub fn engine(&self) -> &Arc<dyn ExtractionEngine> {
        &self.engine
    }

    /// The options every job starts from
    pub fn base_options(&self) -> &JobOptions {
        &self.base
    }

    /// Validate a request and derive its job options without starting anything
    pub fn prepare(&self, request: &DownloadRequest) -> Result<(Url, JobOptions)> {
        let url = validate_url(&request.url)?;
        Ok((url, self.base.for_request(request)))
    }

    /// Start a download job
    ///
    /// Validation failures are returned here, before any worker exists.
    /// Otherwise one worker task is spawned and a handle to its event stream
    /// is returned immediately. Must be called from within a tokio runtime.
    pub fn launch(&self, request: DownloadRequest) -> Result<StreamHandle> {
        let (url, options) = self.prepare(&request)?;
        let id = JobId::new();

        debug!(
            job_id = %id,
            state = ?JobState::Pending,
            convert_to = ?request.convert_to,
            final_ext = ?options.final_ext,
            "job accepted"
        );

        let (tx, rx) = progress_channel();
        let cancel = CancellationToken::new();
        let guard = self
            .cancel_on_disconnect
            .then(|| cancel.clone().drop_guard());

        tokio::spawn(run_job(
            id,
            self.engine.clone(),
            url.into(),
            options,
            tx,
            cancel,
        ));

        Ok(StreamHandle {
            id,
            events: rx,
            _cancel: guard,
        })
    }
}

/// Consumer side of a launched job
///
/// Owned by exactly one reader. Dropping it before the job finishes cancels
/// the worker when the launcher was configured to do so.
#[derive(Debug)]
pub struct StreamHandle {
    id: JobId,
    events: ProgressReceiver,
    _cancel: Option<DropGuard>,
}

impl StreamHandle {
    /// Identifier of the job
    pub fn id(&self) -> JobId {
        self.id
    }

    /// Wait for the job's next event; `None` once the job has terminated
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Read the whole event sequence
    pub async fn collect(mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }
}

async fn run_job(
    id: JobId,
    engine: Arc<dyn ExtractionEngine>,
    url: String,
    options: JobOptions,
    tx: ProgressSender,
    cancel: CancellationToken,
) {
    info!(
        job_id = %id,
        state = ?JobState::Running,
        engine = engine.name(),
        url = %url,
        steps = options.postprocessors.len(),
        "job running"
    );

    let status_tx = tx.clone();
    let hook = ProgressHook::new(move |payload| {
        status_tx.send(ProgressEvent::Status(payload));
    });

    let run = AssertUnwindSafe(engine.download(&url, &options, hook)).catch_unwind();
    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        outcome = run => Some(outcome),
    };

    let event = match outcome {
        None => {
            info!(job_id = %id, state = ?JobState::Cancelled, "job cancelled, stream dropped");
            return;
        }
        Some(Ok(Ok(result))) => {
            info!(job_id = %id, state = ?JobState::Completed, "job completed");
            ProgressEvent::Result(result)
        }
        Some(Ok(Err(e))) => {
            warn!(
                job_id = %id,
                state = ?JobState::Failed,
                kind = %e.kind,
                error = %e.message,
                "job failed"
            );
            ProgressEvent::Error(e)
        }
        Some(Err(panic)) => {
            let message = panic_message(panic.as_ref());
            error!(job_id = %id, state = ?JobState::Failed, error = %message, "engine panicked");
            ProgressEvent::Error(EngineError::internal(format!("engine panicked: {message}")))
        }
    };

    if !tx.send(event) {
        debug!(job_id = %id, "terminal event dropped, nobody is listening");
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
