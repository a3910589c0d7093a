use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("pipeline_cycles_total", "Completed cycles by outcome.");
        describe_counter!(
            "pipeline_stage_failures_total",
            "Failed (topic, language) pairs by stage."
        );
        describe_counter!(
            "synthesis_tier_total",
            "Audio artifacts produced, by cascade tier."
        );
        describe_counter!(
            "ranking_skipped_total",
            "Candidates dropped by the ranker (missing title)."
        );
        describe_counter!(
            "ingest_source_errors_total",
            "Candidate source fetch/parse errors."
        );
        describe_counter!("ingest_candidates_total", "Candidates gathered from sources.");
        describe_counter!(
            "feedback_collect_errors_total",
            "Per-upload feedback collection failures."
        );
        describe_histogram!("pipeline_cycle_ms", "Cycle wall time in milliseconds.");
        describe_histogram!("ingest_gather_ms", "Source gathering time in milliseconds.");
        describe_histogram!("ingest_parse_ms", "Source parse time in milliseconds.");
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the global Prometheus recorder. Fails if one is already installed.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// A handle backed by a recorder that is not installed globally.
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        Self {
            handle: recorder.handle(),
        }
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
