#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::Config;
use crate::engine::{
    EngineCapabilities, EngineResult, ExtractionEngine, NoOpEngine, ProgressHook, ScriptedEngine,
};
use crate::error::{EngineError, EngineErrorKind, Error};
use crate::options::JobOptions;
use crate::postprocessor::PostprocessorStep;
use crate::types::{DownloadRequest, ProgressEvent};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const TRACK: &str = "https://music.youtube.com/watch?v=abc123";

fn launcher_for(engine: Arc<ScriptedEngine>) -> JobLauncher {
    JobLauncher::new(engine, JobOptions::default())
}

#[tokio::test]
async fn status_events_precede_exactly_one_result() {
    let engine = Arc::new(
        ScriptedEngine::succeeding(json!({"id": "abc123", "ext": "webm"})).with_progress(vec![
            json!({"status": "downloading", "downloaded_bytes": 10}),
            json!({"status": "downloading", "downloaded_bytes": 20}),
            json!({"status": "finished"}),
        ]),
    );
    let launcher = launcher_for(engine.clone());

    let events = launcher
        .launch(DownloadRequest::new(TRACK))
        .unwrap()
        .collect()
        .await;

    assert_eq!(events.len(), 4);
    assert!(events[..3].iter().all(|e| matches!(e, ProgressEvent::Status(_))));
    assert_eq!(
        events[0],
        ProgressEvent::Status(json!({"status": "downloading", "downloaded_bytes": 10}))
    );
    assert_eq!(events[3], ProgressEvent::Result(json!({"id": "abc123", "ext": "webm"})));
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
}

#[tokio::test]
async fn engine_failure_becomes_error_event() {
    let engine = Arc::new(
        ScriptedEngine::failing(EngineError::new(
            EngineErrorKind::Unavailable,
            "Video unavailable",
        ))
        .with_progress(vec![json!({"status": "downloading"})]),
    );
    let launcher = launcher_for(engine);

    let events = launcher
        .launch(DownloadRequest::new(TRACK))
        .unwrap()
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    match &events[1] {
        ProgressEvent::Error(e) => {
            assert_eq!(e.kind, EngineErrorKind::Unavailable);
            assert_eq!(e.message, "Video unavailable");
        }
        other => panic!("expected error event, got {other:?}"),
    }
}

#[tokio::test]
async fn convert_to_prepends_extract_step_for_that_job_only() {
    let engine = Arc::new(ScriptedEngine::succeeding(json!({"id": "abc123"})));
    let launcher = launcher_for(engine.clone());

    launcher
        .launch(DownloadRequest::new(TRACK).with_convert_to("mp3"))
        .unwrap()
        .collect()
        .await;
    launcher
        .launch(DownloadRequest::new(TRACK))
        .unwrap()
        .collect()
        .await;

    let calls = engine.calls();
    assert_eq!(calls.len(), 2);

    let converted = &calls[0].options;
    assert_eq!(converted.postprocessors.len(), 3);
    assert_eq!(
        converted.postprocessors[0],
        PostprocessorStep::ExtractAudio {
            preferred_codec: Some("mp3".to_string()),
            preferred_quality: None,
        }
    );
    assert_eq!(converted.final_ext.as_deref(), Some("mp3"));

    let plain = &calls[1].options;
    assert_eq!(plain, &JobOptions::default());
    assert_eq!(launcher.base_options(), &JobOptions::default());
}

#[tokio::test]
async fn unknown_convert_to_is_ignored() {
    let engine = Arc::new(ScriptedEngine::succeeding(json!({})));
    let launcher = launcher_for(engine.clone());

    launcher
        .launch(DownloadRequest::new(TRACK).with_convert_to("mp5"))
        .unwrap()
        .collect()
        .await;

    assert_eq!(engine.calls()[0].options, JobOptions::default());
}

/// Engine whose every payload names the URL it was started for
struct EchoEngine;

#[async_trait::async_trait]
impl ExtractionEngine for EchoEngine {
    async fn extract_info(
        &self,
        url: &str,
        _options: &JobOptions,
        _process: bool,
    ) -> EngineResult<serde_json::Value> {
        Ok(json!({"url": url}))
    }

    async fn download(
        &self,
        url: &str,
        _options: &JobOptions,
        progress: ProgressHook,
    ) -> EngineResult<serde_json::Value> {
        for n in 0..5 {
            tokio::time::sleep(Duration::from_millis(3)).await;
            progress.report(json!({"url": url, "n": n}));
        }
        Ok(json!({"url": url, "done": true}))
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_extract: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

fn assert_only_own_events(events: &[ProgressEvent], url: &str) {
    assert_eq!(events.len(), 6, "{url}: {events:?}");
    for (n, event) in events[..5].iter().enumerate() {
        assert_eq!(event, &ProgressEvent::Status(json!({"url": url, "n": n})));
    }
    assert_eq!(events[5], ProgressEvent::Result(json!({"url": url, "done": true})));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_jobs_do_not_share_events() {
    let launcher = JobLauncher::new(Arc::new(EchoEngine), JobOptions::default());
    let urls: Vec<String> = (0..4)
        .map(|i| format!("https://music.youtube.com/watch?v=job{i}"))
        .collect();

    let handles: Vec<_> = urls
        .iter()
        .map(|url| launcher.launch(DownloadRequest::new(url.as_str())).unwrap())
        .collect();
    let streams = futures::future::join_all(handles.into_iter().map(StreamHandle::collect)).await;

    for (events, url) in streams.iter().zip(&urls) {
        assert_only_own_events(events, url);
    }
}

#[tokio::test]
async fn concurrent_jobs_keep_their_own_options() {
    let engine = Arc::new(
        ScriptedEngine::succeeding(json!({"id": "shared"}))
            .with_progress(vec![json!(1)])
            .with_step_delay(Duration::from_millis(5)),
    );
    let launcher = launcher_for(engine.clone());

    let first = launcher.launch(DownloadRequest::new(TRACK)).unwrap();
    let second = launcher
        .launch(DownloadRequest::new(TRACK).with_convert_to("flac"))
        .unwrap();
    assert_ne!(first.id(), second.id());
    tokio::join!(first.collect(), second.collect());

    let finals: Vec<_> = engine
        .calls()
        .into_iter()
        .map(|c| c.options.final_ext)
        .collect();
    assert!(finals.contains(&None));
    assert!(finals.contains(&Some("flac".to_string())));
}

#[tokio::test]
async fn missing_url_is_rejected_before_engine_runs() {
    let engine = Arc::new(ScriptedEngine::succeeding(json!({})));
    let launcher = launcher_for(engine.clone());

    let err = launcher.launch(DownloadRequest::new("   ")).unwrap_err();
    assert!(matches!(err, Error::Validation { ref field, .. } if field.as_deref() == Some("url")));

    let err = launcher
        .launch(DownloadRequest::new("ftp://example.test/a.mp3"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation { .. }));

    tokio::task::yield_now().await;
    assert!(engine.calls().is_empty());
}

#[test]
fn validate_url_accepts_http_and_https() {
    assert_eq!(
        validate_url(&format!("  {TRACK} ")).unwrap().as_str(),
        TRACK
    );
    assert!(validate_url("http://example.test/a").is_ok());
    assert!(validate_url("not a url").is_err());
    assert!(validate_url("file:///etc/passwd").is_err());
    assert!(validate_url("").is_err());
}

#[tokio::test]
async fn engine_panic_is_reported_as_internal_error() {
    let engine = Arc::new(
        ScriptedEngine::panicking("extractor exploded").with_progress(vec![json!("started")]),
    );
    let launcher = launcher_for(engine);

    let events = launcher
        .launch(DownloadRequest::new(TRACK))
        .unwrap()
        .collect()
        .await;

    assert_eq!(events.len(), 2);
    match &events[1] {
        ProgressEvent::Error(e) => {
            assert_eq!(e.kind, EngineErrorKind::Internal);
            assert!(e.message.contains("extractor exploded"));
        }
        other => panic!("expected error event, got {other:?}"),
    }
}

#[tokio::test]
async fn dropping_the_handle_cancels_the_job() {
    let engine = Arc::new(
        ScriptedEngine::succeeding(json!({}))
            .with_progress(vec![json!(1), json!(2), json!(3)])
            .with_step_delay(Duration::from_millis(50)),
    );
    let launcher = launcher_for(engine.clone());

    let mut handle = launcher.launch(DownloadRequest::new(TRACK)).unwrap();
    assert_eq!(handle.next_event().await, Some(ProgressEvent::Status(json!(1))));
    drop(handle);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(engine.calls().len(), 1);
    assert_eq!(engine.finished_downloads(), 0);
}

#[tokio::test]
async fn job_runs_to_completion_when_cancellation_is_disabled() {
    let engine = Arc::new(
        ScriptedEngine::succeeding(json!({}))
            .with_progress(vec![json!(1), json!(2)])
            .with_step_delay(Duration::from_millis(20)),
    );
    let launcher = launcher_for(engine.clone()).with_cancel_on_disconnect(false);

    let handle = launcher.launch(DownloadRequest::new(TRACK)).unwrap();
    drop(handle);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(engine.finished_downloads(), 1);
}

#[tokio::test]
async fn noop_engine_fails_jobs_in_band() {
    let launcher = JobLauncher::from_config(Arc::new(NoOpEngine), &Config::default());
    assert_eq!(launcher.engine().name(), "noop");

    let events = launcher
        .launch(DownloadRequest::new(TRACK))
        .unwrap()
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        ProgressEvent::Error(e) if e.kind == EngineErrorKind::NotFound
    ));
}
