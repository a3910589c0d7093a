// src/feedback/mod.rs
//! Deferred engagement feedback: the collector contract, the shipped JSONL
//! collector and batch collection. Scheduling lives in [`scheduler`].

pub mod scheduler;

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use metrics::counter;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub use scheduler::{DeferredTask, FeedbackScheduler};

use crate::error::DeferredTaskFailure;
use crate::model::{FeedbackItem, ScriptArtifact, UploadHandle};

#[async_trait]
pub trait MetricsCollector: Send + Sync {
    async fn collect(&self, upload: &UploadHandle, script: &ScriptArtifact) -> Result<()>;
}

/// Appends one JSON line per collected upload.
pub struct FeedbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

#[derive(Serialize)]
struct FeedbackLine<'a> {
    collected_at: chrono::DateTime<Utc>,
    upload_id: &'a str,
    platform: &'a str,
    language: &'a str,
    location: &'a str,
    topic: &'a str,
    title: &'a str,
    category: &'a str,
    hours_live: f64,
    artifact_bytes: Option<u64>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl MetricsCollector for FeedbackLog {
    async fn collect(&self, upload: &UploadHandle, script: &ScriptArtifact) -> Result<()> {
        let now = Utc::now();
        let artifact_bytes = tokio::fs::metadata(&upload.location)
            .await
            .ok()
            .map(|m| m.len());
        let line = FeedbackLine {
            collected_at: now,
            upload_id: &upload.id,
            platform: &upload.platform,
            language: &upload.language,
            location: &upload.location,
            topic: &script.topic,
            title: &script.title,
            category: script.category.as_str(),
            hours_live: (now - upload.uploaded_at).num_seconds().max(0) as f64 / 3600.0,
            artifact_bytes,
        };
        let mut buf = serde_json::to_vec(&line).context("encoding feedback line")?;
        buf.push(b'\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        let mut f = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening {}", self.path.display()))?;
        f.write_all(&buf).await.context("appending feedback line")?;
        f.flush().await.context("flushing feedback log")?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FeedbackReport {
    pub collected: usize,
    pub failures: Vec<DeferredTaskFailure>,
}

/// Collect every item once. Per-item failures are logged and reported; the
/// batch always runs to the end.
pub async fn collect_batch(
    collector: &dyn MetricsCollector,
    items: &[FeedbackItem],
) -> FeedbackReport {
    let mut report = FeedbackReport::default();
    for item in items {
        match collector.collect(&item.upload, &item.script).await {
            Ok(()) => report.collected += 1,
            Err(e) => {
                let failure = DeferredTaskFailure {
                    upload_id: item.upload.id.clone(),
                    reason: format!("{e:#}"),
                };
                tracing::warn!(target: "feedback", error = %failure, "feedback collection failed");
                counter!("feedback_collect_errors_total").increment(1);
                report.failures.push(failure);
            }
        }
    }
    report
}
