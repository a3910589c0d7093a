//! Error taxonomy of the core.
//!
//! Collaborators speak `anyhow`; each component boundary turns their errors
//! into one of these typed records. Only [`CycleError`] ever crosses the
//! orchestrator boundary.

use thiserror::Error;

use crate::model::{ErrorRecord, SourceFailure, Stage};

/// A candidate source failed; it contributes nothing to ranking.
#[derive(Debug, Clone, Error)]
#[error("source `{source_name}` unavailable: {reason}")]
pub struct SourceUnavailable {
    pub source_name: String,
    pub reason: String,
}

impl From<SourceUnavailable> for SourceFailure {
    fn from(e: SourceUnavailable) -> Self {
        SourceFailure {
            source: e.source_name,
            reason: e.reason,
        }
    }
}

/// One stage failed for one (topic, language) pair.
#[derive(Debug, Clone, Error)]
#[error("{stage} stage failed: {reason}")]
pub struct StageFailure {
    pub stage: Stage,
    pub reason: String,
}

impl StageFailure {
    pub fn new(stage: Stage, err: impl std::fmt::Display) -> Self {
        Self {
            stage,
            reason: err.to_string(),
        }
    }

    /// Captures the full `anyhow` context chain as the reason.
    pub fn from_anyhow(stage: Stage, err: &anyhow::Error) -> Self {
        Self {
            stage,
            reason: format!("{err:#}"),
        }
    }
}

impl From<StageFailure> for ErrorRecord {
    fn from(e: StageFailure) -> Self {
        ErrorRecord {
            stage: e.stage,
            message: e.reason,
        }
    }
}

/// Metrics collection for one upload failed; the batch carries on.
#[derive(Debug, Clone, Error)]
#[error("feedback collection failed for upload `{upload_id}`: {reason}")]
pub struct DeferredTaskFailure {
    pub upload_id: String,
    pub reason: String,
}

/// Unexpected error outside the per-pair isolation boundary; fatal to one cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("no candidate sources configured")]
    NoSources,

    #[error("no target languages requested")]
    NoLanguages,

    #[error("output layout unavailable: {0}")]
    Layout(#[from] std::io::Error),

    #[error("cycle task aborted: {0}")]
    Aborted(String),
}
