// src/ingest/types.rs
use anyhow::Result;

use crate::model::Candidate;

/// One external trend source. A failed fetch contributes nothing to ranking.
#[async_trait::async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Candidate>>;
    fn name(&self) -> &'static str;
}
