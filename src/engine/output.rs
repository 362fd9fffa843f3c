//! Parsing of yt-dlp console output

use super::args::PROGRESS_MARKER;
use crate::error::{EngineError, EngineErrorKind};

/// One line of yt-dlp output, classified
#[derive(Debug, PartialEq)]
pub(crate) enum OutputLine {
    /// A progress report emitted through the progress template
    Progress(serde_json::Value),
    /// A complete JSON document (the final metadata)
    Document(serde_json::Value),
    /// An `ERROR:` line, without the prefix
    Error(String),
    /// Anything else
    Other,
}

/// Classify a single line
pub(crate) fn parse_line(line: &str) -> OutputLine {
    let line = line.trim();

    if let Some(payload) = line.strip_prefix(PROGRESS_MARKER) {
        return match serde_json::from_str(payload) {
            Ok(value) => OutputLine::Progress(value),
            Err(_) => OutputLine::Other,
        };
    }

    if let Some(message) = line.strip_prefix("ERROR:") {
        return OutputLine::Error(message.trim().to_string());
    }

    if line.starts_with('{')
        && let Ok(value) = serde_json::from_str::<serde_json::Value>(line)
    {
        return OutputLine::Document(value);
    }

    OutputLine::Other
}

/// Build an engine error from a failed run's stderr and exit code
pub(crate) fn classify_failure(stderr: &str, exit_code: Option<i32>) -> EngineError {
    let message = stderr
        .lines()
        .rev()
        .find_map(|line| match parse_line(line) {
            OutputLine::Error(message) => Some(message),
            _ => None,
        })
        .or_else(|| {
            stderr
                .lines()
                .map(str::trim)
                .rfind(|line| !line.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| match exit_code {
            Some(code) => format!("yt-dlp exited with status {code}"),
            None => "yt-dlp was terminated by a signal".to_string(),
        });

    EngineError::new(classify_message(&message), message)
}

fn classify_message(message: &str) -> EngineErrorKind {
    let lower = message.to_ascii_lowercase();
    let any = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if any(&["unsupported url", "is not a valid url"]) {
        EngineErrorKind::UnsupportedUrl
    } else if any(&[
        "video unavailable",
        "private video",
        "not available",
        "has been removed",
        "members-only",
        "sign in to confirm your age",
    ]) {
        EngineErrorKind::Unavailable
    } else if any(&["postprocessing", "ffmpeg", "ffprobe"]) {
        EngineErrorKind::Postprocess
    } else if any(&[
        "unable to download webpage",
        "timed out",
        "connection",
        "name resolution",
        "getaddrinfo",
        "http error 5",
    ]) {
        EngineErrorKind::Network
    } else {
        EngineErrorKind::Extraction
    }
}
