//! Continuous mode: run a cycle, wait the interval, repeat until cancelled.
//!
//! Each cycle runs in its own task so a panic inside it is observed as a
//! `JoinError` here and logged; the loop keeps going either way.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::CycleError;
use crate::model::PipelineRun;

/// Returns the number of cycles started before shutdown.
pub async fn run_continuous<F, Fut>(
    mut cycle: F,
    interval: Duration,
    shutdown: CancellationToken,
) -> usize
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PipelineRun, CycleError>> + Send + 'static,
{
    let mut started = 0usize;
    tracing::info!(target: "runner", interval_secs = interval.as_secs(), "continuous mode started");

    while !shutdown.is_cancelled() {
        started += 1;
        let res = match tokio::spawn(cycle()).await {
            Ok(res) => res,
            Err(join) => Err(CycleError::Aborted(join.to_string())),
        };

        match res {
            Ok(run) => tracing::info!(
                target: "runner",
                cycle = started,
                run = %run.id,
                done = run.done_count(),
                failed = run.error_count(),
                "cycle complete"
            ),
            Err(e) => tracing::error!(target: "runner", cycle = started, error = %e, "cycle failed"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!(target: "runner", cycles = started, "continuous mode stopped");
    started
}
