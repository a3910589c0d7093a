// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod model;
pub mod storage;

// Discovery and ranking
pub mod ingest;
pub mod ranking;

// Per-(topic, language) stages
pub mod affiliate;
pub mod pipeline;
pub mod publish;
pub mod render;
pub mod script;
pub mod voice;

// Cycle orchestration, deferred feedback, continuous mode
pub mod bootstrap;
pub mod feedback;
pub mod orchestrator;
pub mod runner;

// Status surface
pub mod api;
pub mod history;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::bootstrap::PipelineRuntime;
pub use crate::config::PipelineConfig;
pub use crate::error::CycleError;
pub use crate::model::{PipelineRun, RunOutcome, TopicResult};
pub use crate::orchestrator::CycleOrchestrator;
