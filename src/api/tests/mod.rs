use super::*;
use crate::engine::{ExtractionEngine, ScriptedEngine};
use crate::options::JobOptions;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;


/// Router backed by the given engine with default configuration
fn test_router(engine: Arc<dyn ExtractionEngine>) -> Router {
    test_router_with_config(engine, Config::default())
}

fn test_router_with_config(engine: Arc<dyn ExtractionEngine>, config: Config) -> Router {
    let config = Arc::new(config);
    let launcher = Arc::new(JobLauncher::from_config(engine, &config));
    create_router(launcher, config)
}

fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn test_api_server_serves_and_shuts_down() {
    let mut config = Config::default();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);
    let launcher = Arc::new(JobLauncher::new(
        Arc::new(ScriptedEngine::succeeding(serde_json::json!({}))),
        JobOptions::default(),
    ));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(serve_until(launcher, config, async {
        let _ = stop_rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(50)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cors_enabled() {
    let app = test_router(Arc::new(ScriptedEngine::succeeding(serde_json::json!({}))));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_specific_origins() {
    let mut config = Config::default();
    config.server.api.cors_origins = vec!["http://localhost:3000".to_string()];
    let app = test_router_with_config(
        Arc::new(ScriptedEngine::succeeding(serde_json::json!({}))),
        config,
    );

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_cors_disabled() {
    let mut config = Config::default();
    config.server.api.cors_enabled = false;
    let app = test_router_with_config(
        Arc::new(ScriptedEngine::succeeding(serde_json::json!({}))),
        config,
    );

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_router(Arc::new(ScriptedEngine::succeeding(serde_json::json!({}))));

    let request = Request::builder()
        .uri("/downloads")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_found");
    assert!(json["error"]["message"].as_str().unwrap().contains("/downloads"));
}
