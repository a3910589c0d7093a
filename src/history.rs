//! In-memory ring of recent run summaries for the status surface.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{PipelineRun, RunMode, RunOutcome};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub id: String,
    pub mode: RunMode,
    pub created_at: DateTime<Utc>,
    pub outcome: RunOutcome,
    pub done: usize,
    pub failed: usize,
    pub degraded_audio: usize,
    pub topics: Vec<String>,
    pub failed_sources: Vec<String>,
    pub feedback_task: Option<u64>,
}

impl RunSummary {
    pub fn from_run(run: &PipelineRun, feedback_task: Option<u64>) -> Self {
        Self {
            id: run.id.clone(),
            mode: run.mode,
            created_at: run.created_at,
            outcome: run.outcome(),
            done: run.done_count(),
            failed: run.error_count(),
            degraded_audio: run
                .results
                .iter()
                .filter_map(|r| r.artifacts())
                .filter(|a| a.audio.degraded)
                .count(),
            topics: run.topics().into_iter().map(String::from).collect(),
            failed_sources: run.failed_sources.iter().map(|f| f.source.clone()).collect(),
            feedback_task,
        }
    }
}

#[derive(Debug)]
pub struct History {
    inner: Mutex<Vec<RunSummary>>,
    cap: usize,
}

impl History {
    pub fn with_capacity(cap: usize) -> Self {
        let cap = cap.clamp(1, 10_000);
        Self {
            inner: Mutex::new(Vec::with_capacity(cap)),
            cap,
        }
    }

    pub fn push(&self, s: RunSummary) {
        let mut v = self.lock();
        v.push(s);
        if v.len() > self.cap {
            let excess = v.len() - self.cap;
            v.drain(0..excess);
        }
    }

    /// Oldest first.
    pub fn snapshot_last_n(&self, n: usize) -> Vec<RunSummary> {
        let v = self.lock();
        let start = v.len().saturating_sub(n);
        v[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RunSummary>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}
