use super::*;
use crate::{Config, HttpFetcher, TitleExtractor};
use axum::body::Body;
use axum::extract::{Request, connect_info::MockConnectInfo};
use axum::http::{Method, StatusCode, header};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod system;

/// Config with a seeded jitter sequence so delays are reproducible
fn test_config() -> Config {
    let mut config = Config::default();
    config.runner.jitter_seed = Some(11);
    config
}

fn test_router(config: Config) -> Router {
    let config = Arc::new(config);
    let runner = Arc::new(BatchRunner::new(
        Arc::new(HttpFetcher::new().unwrap()),
        Arc::new(TitleExtractor),
        config.runner.clone(),
    ));
    create_router(runner, config)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_api_server_spawns_and_shuts_down() {
    let mut config = test_config();
    config.server.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);
    let runner = Arc::new(BatchRunner::new(
        Arc::new(HttpFetcher::new().unwrap()),
        Arc::new(TitleExtractor),
        config.runner.clone(),
    ));

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(start_api_server(runner, config, async {
        rx.await.ok();
    }));

    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_api_server_reports_bind_failure() {
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = test_config();
    config.server.bind_address = occupied.local_addr().unwrap();
    let config = Arc::new(config);
    let runner = Arc::new(BatchRunner::new(
        Arc::new(HttpFetcher::new().unwrap()),
        Arc::new(TitleExtractor),
        config.runner.clone(),
    ));

    let result = start_api_server(runner, config, std::future::pending()).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}
