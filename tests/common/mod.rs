//! Common test utilities for ytm-backend integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use serde_json::json;
use ytm_backend::engine::EngineCapabilities;
use ytm_backend::{Config, EngineError, ExtractionEngine, JobLauncher, JobOptions, ProgressHook};

/// A backend running on a real socket
pub struct RunningServer {
    pub addr: SocketAddr,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<ytm_backend::Result<()>>,
}

impl RunningServer {
    /// Start a server for `engine` on a free local port
    pub async fn start(engine: Arc<dyn ExtractionEngine>) -> Self {
        let addr = free_local_addr();
        let mut config = Config::default();
        config.server.api.bind_address = addr;
        let config = Arc::new(config);
        let launcher = Arc::new(JobLauncher::from_config(engine, &config));

        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(ytm_backend::api::serve_until(launcher, config, async {
            let _ = stopped.await;
        }));

        wait_until_listening(addr).await;
        Self {
            addr,
            stop: Some(stop),
            task,
        }
    }

    /// Ask the server to stop and wait for it
    pub async fn shutdown(mut self) -> ytm_backend::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("server did not shut down")
            .expect("server task panicked")
    }
}

fn free_local_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind port finder socket");
    listener.local_addr().expect("port finder address")
}

async fn wait_until_listening(addr: SocketAddr) {
    for _ in 0..50 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server never started listening on {addr}");
}

/// Raw HTTP/1.0 response: status code, lowercase headers, body
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Send one HTTP/1.0 request and read the response until the server closes
///
/// HTTP/1.0 keeps the body unchunked, so NDJSON lines arrive verbatim.
pub async fn send(addr: SocketAddr, method: &str, path: &str, body: Option<&str>) -> RawResponse {
    let mut stream = TcpStream::connect(addr).await.expect("connect");

    let mut request = format!("{method} {path} HTTP/1.0\r\nHost: {addr}\r\n");
    if let Some(body) = body {
        request.push_str("Content-Type: application/json\r\n");
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");
    if let Some(body) = body {
        request.push_str(body);
    }
    stream.write_all(request.as_bytes()).await.expect("write request");

    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.expect("read response");
    let raw = String::from_utf8(raw).expect("utf-8 response");

    let (head, body) = raw.split_once("\r\n\r\n").expect("header terminator");
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .expect("status line");
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    RawResponse {
        status,
        headers,
        body: body.to_string(),
    }
}

/// Engine whose progress and result name the URL each download was started for
pub struct UrlEchoEngine;

#[async_trait::async_trait]
impl ExtractionEngine for UrlEchoEngine {
    async fn extract_info(
        &self,
        url: &str,
        _options: &JobOptions,
        _process: bool,
    ) -> Result<serde_json::Value, EngineError> {
        Ok(json!({"url": url}))
    }

    async fn download(
        &self,
        url: &str,
        _options: &JobOptions,
        progress: ProgressHook,
    ) -> Result<serde_json::Value, EngineError> {
        for n in 0..4 {
            tokio::time::sleep(Duration::from_millis(5)).await;
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
        "url-echo"
    }
}
