//! End-to-end: HTTP payload through the runner to a live target server.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use repeat_fetch::{
    BatchRequest, BatchRunner, Config, HttpFetcher, JITTER_WINDOW, TitleExtractor, api,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runner_for(config: &Config) -> Arc<BatchRunner> {
    Arc::new(BatchRunner::new(
        Arc::new(HttpFetcher::new().unwrap()),
        Arc::new(TitleExtractor),
        config.runner.clone(),
    ))
}

fn config_from_toml(raw: &str) -> Config {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), raw).unwrap();
    Config::from_file(file.path()).unwrap()
}

#[tokio::test]
async fn mixed_outcomes_are_reported_in_order() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<title>  First &amp; Only  </title>"),
        )
        .up_to_n_times(1)
        .mount(&target)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&target)
        .await;

    let config = config_from_toml(
        r#"
        [runner]
        jitter_seed = 3
        "#,
    );
    let app = api::create_router(runner_for(&config), Arc::new(config));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/proxy")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "url": target.uri(), "count": 2, "delay": 500 }).to_string(),
        ))
        .unwrap();

    let started = Instant::now();
    let response = app.oneshot(request).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(elapsed >= Duration::from_millis(500), "elapsed {elapsed:?}");
    assert!(
        elapsed < Duration::from_millis(500) + JITTER_WINDOW + Duration::from_secs(2),
        "elapsed {elapsed:?}"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["totalAttempts"], 2);

    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["attempt"], 1);
    assert_eq!(results[0]["status"], "success");
    assert_eq!(results[0]["statusCode"], 200);
    assert_eq!(results[0]["title"], "First & Only");

    assert_eq!(results[1]["attempt"], 2);
    assert_eq!(results[1]["status"], "error");
    assert_eq!(results[1]["error"], "request failed with status code 500");

    let first: chrono::DateTime<chrono::Utc> =
        results[0]["timestamp"].as_str().unwrap().parse().unwrap();
    let second: chrono::DateTime<chrono::Utc> =
        results[1]["timestamp"].as_str().unwrap().parse().unwrap();
    assert!(second >= first);
}

#[tokio::test]
async fn unreachable_target_fails_every_attempt() {
    // Grab a free port, then release it so nothing is listening
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let mut config = Config::default();
    config.runner.jitter_seed = Some(5);
    let runner = runner_for(&config);

    let request = BatchRequest::new(
        format!("http://127.0.0.1:{port}/"),
        2,
        Duration::from_millis(10),
    );
    let report = runner.run(&request).await.unwrap();

    assert_eq!(report.total_attempts, 2);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.succeeded(), 0);
}

#[tokio::test]
async fn page_without_title_gets_fallback_label() {
    let target = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&target)
        .await;

    let mut config = Config::default();
    config.runner.jitter_seed = Some(5);
    let runner = runner_for(&config);

    let report = runner
        .run(&BatchRequest::new(target.uri(), 1, Duration::ZERO))
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    match &report.results[0].result {
        repeat_fetch::AttemptResult::Succeeded { status_code, title } => {
            assert_eq!(*status_code, 204);
            assert_eq!(title, repeat_fetch::NO_TITLE_FALLBACK);
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn config_file_cannot_disable_jitter() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), "[runner]\njitter_window_ms = 0\n").unwrap();

    let result = Config::from_file(file.path());
    assert!(
        matches!(result, Err(repeat_fetch::Error::Config { .. })),
        "{result:?}"
    );

    // Every seeded delay still lands inside the fixed window
    let mut jitter = repeat_fetch::Jitter::seeded(0);
    let base = Duration::from_millis(500);
    let delays: Vec<Duration> = (0..5).map(|_| jitter.next_delay(base)).collect();
    assert!(delays.iter().all(|d| *d >= base && *d < base + JITTER_WINDOW));
    assert!(delays.iter().any(|d| *d != delays[0]), "{delays:?}");
}
