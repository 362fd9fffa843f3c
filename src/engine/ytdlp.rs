//! Engine backed by the external yt-dlp binary

use super::args::{download_args, info_args};
use super::output::{OutputLine, classify_failure, parse_line};
use super::{EngineCapabilities, EngineResult, ExtractionEngine, ProgressHook};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineErrorKind};
use crate::options::{IgnoreErrors, JobOptions};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, trace, warn};

/// Engine that runs yt-dlp as a child process
///
/// Each call spawns one process. Children are killed when the call's future
/// is dropped, so cancelling a job stops its download.
///
/// # Examples
///
/// ```no_run
/// use ytm_backend::engine::{ExtractionEngine, YtDlpEngine};
/// use ytm_backend::options::JobOptions;
/// use std::path::PathBuf;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // Create with explicit path
/// let engine = YtDlpEngine::new(PathBuf::from("/usr/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
///
/// let info = engine
///     .extract_info("https://music.youtube.com/watch?v=xyz", &JobOptions::default(), false)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct YtDlpEngine {
    binary_path: PathBuf,
}

impl YtDlpEngine {
    /// Create an engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Resolve the binary from configuration
    ///
    /// An explicit `binary_path` wins; otherwise PATH is searched when
    /// `search_path` is set.
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        match &config.binary_path {
            Some(path) => Some(Self::new(path.clone())),
            None if config.search_path => Self::from_path(),
            None => None,
        }
    }

    /// Path of the binary this engine runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn command(&self, args: Vec<String>, url: &str) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> EngineError {
        let kind = if e.kind() == std::io::ErrorKind::NotFound {
            EngineErrorKind::NotFound
        } else {
            EngineErrorKind::Spawn
        };
        EngineError::new(
            kind,
            format!("failed to execute {}: {}", self.binary_path.display(), e),
        )
    }
}

/// Read `reader` line by line, forwarding progress and collecting the rest
async fn drain_lines<R: AsyncRead + Unpin>(
    reader: R,
    progress: &ProgressHook,
) -> std::io::Result<(Option<serde_json::Value>, String)> {
    let mut lines = BufReader::new(reader).lines();
    let mut document = None;
    let mut residue = String::new();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            OutputLine::Progress(payload) => progress.report(payload),
            OutputLine::Document(value) => document = Some(value),
            OutputLine::Error(_) | OutputLine::Other => {
                trace!(line = %line, "yt-dlp output");
                residue.push_str(&line);
                residue.push('\n');
            }
        }
    }

    Ok((document, residue))
}

fn read_error(e: std::io::Error) -> EngineError {
    EngineError::new(
        EngineErrorKind::InvalidOutput,
        format!("failed to read yt-dlp output: {e}"),
    )
}

#[async_trait]
impl ExtractionEngine for YtDlpEngine {
    async fn extract_info(
        &self,
        url: &str,
        options: &JobOptions,
        process: bool,
    ) -> EngineResult<serde_json::Value> {
        debug!(url, process, "extracting metadata with yt-dlp");

        let output = self
            .command(info_args(options, process), url)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(classify_failure(
                &String::from_utf8_lossy(&output.stderr),
                output.status.code(),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            EngineError::new(
                EngineErrorKind::InvalidOutput,
                format!("yt-dlp printed invalid metadata: {e}"),
            )
        })
    }

    async fn download(
        &self,
        url: &str,
        options: &JobOptions,
        progress: ProgressHook,
    ) -> EngineResult<serde_json::Value> {
        debug!(url, steps = options.postprocessors.len(), "downloading with yt-dlp");

        let mut child = self
            .command(download_args(options), url)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::internal("yt-dlp stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::internal("yt-dlp stderr was not captured"))?;

        // Both pipes are drained together so a chatty stderr cannot block the child
        let (stdout_result, stderr_result) =
            tokio::join!(drain_lines(stdout, &progress), drain_lines(stderr, &progress));
        let (document, _) = stdout_result.map_err(read_error)?;
        let (_, stderr_text) = stderr_result.map_err(read_error)?;

        let status = child.wait().await.map_err(|e| {
            EngineError::internal(format!("failed to wait for yt-dlp: {e}"))
        })?;

        if !status.success() {
            let failure = classify_failure(&stderr_text, status.code());
            match document {
                // Skipped entries still end with the playlist metadata
                Some(document) if options.ignore_errors != IgnoreErrors::Never => {
                    warn!(
                        url,
                        kind = %failure.kind,
                        error = %failure.message,
                        "yt-dlp reported errors but printed metadata"
                    );
                    return Ok(document);
                }
                _ => return Err(failure),
            }
        }

        document.ok_or_else(|| {
            EngineError::new(
                EngineErrorKind::InvalidOutput,
                "yt-dlp finished without printing metadata",
            )
        })
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_extract: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
