// tests/api_http.rs
//
// Status router exercised directly via tower::ServiceExt::oneshot, no sockets.
//
// Covered:
// - GET /health
// - GET /runs?limit
// - GET /status
// - GET /metrics

use std::sync::Arc;

use axum::{
    body::{self, Body},
    Router,
};
use http::{Request, StatusCode};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use content_pipeline::api::{self, StatusState};
use content_pipeline::feedback::{FeedbackScheduler, FeedbackLog};
use content_pipeline::history::{History, RunSummary};
use content_pipeline::metrics::Metrics;
use content_pipeline::model::{PipelineRun, RunMode};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router(runs: usize) -> Router {
    let history = Arc::new(History::with_capacity(10));
    for i in 0..runs {
        let mut run = PipelineRun::new(RunMode::Trending);
        run.id = format!("run_{i}");
        history.push(RunSummary::from_run(&run, None));
    }
    let scheduler = Arc::new(FeedbackScheduler::new(Arc::new(FeedbackLog::new(
        std::env::temp_dir().join("content-pipeline-api-test.jsonl"),
    ))));
    api::router(StatusState { history, scheduler }, &Metrics::detached())
}

async fn get(app: Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
}

#[tokio::test]
async fn health_is_ok() {
    let (status, body) = get(test_router(0), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.trim(), "ok");
}

#[tokio::test]
async fn runs_are_newest_first_and_limited() {
    let (status, body) = get(test_router(3), "/runs?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_str(&body).unwrap();
    let ids: Vec<&str> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["run_2", "run_1"]);
    assert_eq!(v[0]["outcome"], "empty");
}

#[tokio::test]
async fn status_reports_last_run_and_pending_feedback() {
    let (status, body) = get(test_router(2), "/status").await;
    assert_eq!(status, StatusCode::OK);
    let v: Json = serde_json::from_str(&body).unwrap();
    assert_eq!(v["runs_recorded"], 2);
    assert_eq!(v["pending_feedback"], 0);
    assert_eq!(v["last_run"]["id"], "run_1");

    let (_, body) = get(test_router(0), "/status").await;
    let v: Json = serde_json::from_str(&body).unwrap();
    assert!(v["last_run"].is_null());
}

#[tokio::test]
async fn metrics_endpoint_answers() {
    let (status, _) = get(test_router(0), "/metrics").await;
    assert_eq!(status, StatusCode::OK);
}
