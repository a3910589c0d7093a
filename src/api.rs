//! Status surface for continuous mode: health, recent runs, pending feedback
//! and Prometheus metrics.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::feedback::FeedbackScheduler;
use crate::history::{History, RunSummary};
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct StatusState {
    pub history: Arc<History>,
    pub scheduler: Arc<FeedbackScheduler>,
}

#[derive(serde::Deserialize)]
struct RunsQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    20
}

#[derive(serde::Serialize)]
struct StatusResp {
    runs_recorded: usize,
    pending_feedback: usize,
    last_run: Option<RunSummary>,
}

pub fn router(state: StatusState, metrics: &Metrics) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/runs", get(runs))
        .route("/status", get(status))
        .with_state(state)
        .merge(metrics.router())
        .layer(CorsLayer::very_permissive())
}

async fn runs(State(state): State<StatusState>, Query(q): Query<RunsQuery>) -> Json<Vec<RunSummary>> {
    let mut v = state.history.snapshot_last_n(q.limit.min(500));
    v.reverse();
    Json(v)
}

async fn status(State(state): State<StatusState>) -> Json<StatusResp> {
    Json(StatusResp {
        runs_recorded: state.history.len(),
        pending_feedback: state.scheduler.pending(),
        last_run: state.history.snapshot_last_n(1).pop(),
    })
}
