// src/feedback/scheduler.rs
//! Owner of delayed, fire-and-forget feedback tasks.
//!
//! Each scheduled batch becomes a spawned task that sleeps for the delay and
//! then runs [`collect_batch`] once. Tasks belong to the scheduler, not to the
//! cycle that produced them: finishing a cycle or dropping the orchestrator
//! leaves them running. Nothing is persisted; a process exit loses them.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::{collect_batch, MetricsCollector};
use crate::model::FeedbackItem;

/// A pending batch of feedback work.
#[derive(Debug, Clone)]
pub struct DeferredTask {
    pub id: u64,
    pub ready_at: DateTime<Utc>,
    pub payload: Vec<FeedbackItem>,
}

struct Entry {
    id: u64,
    handle: JoinHandle<()>,
}

/// Decrements the pending counter exactly once: when the delay elapses or
/// when the task is aborted before that.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FeedbackScheduler {
    collector: Arc<dyn MetricsCollector>,
    next_id: AtomicU64,
    pending: Arc<AtomicUsize>,
    tasks: Mutex<Vec<Entry>>,
}

impl FeedbackScheduler {
    pub fn new(collector: Arc<dyn MetricsCollector>) -> Self {
        Self {
            collector,
            next_id: AtomicU64::new(1),
            pending: Arc::new(AtomicUsize::new(0)),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawn a task that collects feedback for `items` after `delay`.
    /// Returns the task id, or `None` for an empty payload.
    pub fn schedule(&self, items: Vec<FeedbackItem>, delay: Duration) -> Option<u64> {
        if items.is_empty() {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let ready_at = Utc::now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        let task = DeferredTask {
            id,
            ready_at,
            payload: items,
        };

        self.pending.fetch_add(1, Ordering::SeqCst);
        let guard = PendingGuard(Arc::clone(&self.pending));
        let collector = Arc::clone(&self.collector);

        tracing::info!(
            target: "feedback",
            task = id,
            uploads = task.payload.len(),
            ready_at = %task.ready_at,
            "feedback scheduled"
        );

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            drop(guard);
            let report = collect_batch(&*collector, &task.payload).await;
            tracing::info!(
                target: "feedback",
                task = task.id,
                collected = report.collected,
                failed = report.failures.len(),
                "feedback collected"
            );
        });

        match self.tasks.lock() {
            Ok(mut tasks) => {
                tasks.retain(|e| !e.handle.is_finished());
                tasks.push(Entry { id, handle });
            }
            Err(poisoned) => poisoned.into_inner().push(Entry { id, handle }),
        }
        Some(id)
    }

    /// Tasks whose delay has not elapsed yet.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Abort every task that has not finished. Returns how many were aborted.
    pub fn shutdown(&self) -> usize {
        let tasks = self.take_tasks();
        let mut aborted = 0;
        for e in tasks {
            if !e.handle.is_finished() {
                e.handle.abort();
                aborted += 1;
                tracing::debug!(target: "feedback", task = e.id, "feedback task aborted");
            }
        }
        if aborted > 0 {
            tracing::warn!(target: "feedback", aborted, "pending feedback dropped on shutdown");
        }
        aborted
    }

    /// Wait for every task scheduled so far to run to completion.
    pub async fn wait_idle(&self) {
        loop {
            let tasks = self.take_tasks();
            if tasks.is_empty() {
                return;
            }
            for e in tasks {
                if let Err(err) = e.handle.await {
                    if !err.is_cancelled() {
                        tracing::error!(target: "feedback", task = e.id, error = %err, "feedback task panicked");
                    }
                }
            }
        }
    }

    fn take_tasks(&self) -> Vec<Entry> {
        match self.tasks.lock() {
            Ok(mut t) => std::mem::take(&mut *t),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}
