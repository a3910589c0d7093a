//! # Cycle Orchestrator
//! sources → ranking → (topic × language) stage pipeline → aggregation →
//! deferred feedback.
//!
//! Pairs of one topic run concurrently; topics run with bounded concurrency
//! and results keep (topic rank, language list) order regardless of which
//! pair finishes first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};

use crate::config::PipelineConfig;
use crate::error::CycleError;
use crate::feedback::FeedbackScheduler;
use crate::history::{History, RunSummary};
use crate::ingest::{self, topic, types::CandidateSource};
use crate::model::{Category, PipelineRun, RunMode, TopicResult, TrendHint};
use crate::pipeline::StagePipeline;
use crate::ranking::rank;

pub struct CycleOrchestrator {
    config: Arc<PipelineConfig>,
    sources: Vec<Arc<dyn CandidateSource>>,
    pipeline: Arc<StagePipeline>,
    scheduler: Arc<FeedbackScheduler>,
    history: Arc<History>,
}

impl CycleOrchestrator {
    pub fn new(
        config: Arc<PipelineConfig>,
        sources: Vec<Arc<dyn CandidateSource>>,
        pipeline: Arc<StagePipeline>,
        scheduler: Arc<FeedbackScheduler>,
        history: Arc<History>,
    ) -> Self {
        Self {
            config,
            sources,
            pipeline,
            scheduler,
            history,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// One trending cycle over the top `desired_count` candidates. Returns
    /// as soon as results are aggregated; feedback runs later on its own.
    pub async fn run_cycle(&self, desired_count: usize) -> Result<PipelineRun, CycleError> {
        crate::metrics::ensure_metrics_described();
        if self.sources.is_empty() {
            return Err(CycleError::NoSources);
        }
        let languages = self.languages(&self.config.languages)?;
        self.pipeline.layout().prepare()?;

        let t0 = Instant::now();
        let mut run = PipelineRun::new(RunMode::Trending);
        tracing::info!(target: "orchestrator", run = %run.id, desired_count, "cycle started");

        let harvest = ingest::gather(&self.sources).await;
        let ranking = rank(&harvest.candidates, desired_count, &self.config.scoring);
        run.candidates_considered = harvest.candidates.len();
        run.skipped_candidates = ranking.skipped;
        run.failed_sources = harvest.failures;

        if ranking.ranked.is_empty() {
            tracing::warn!(
                target: "orchestrator",
                run = %run.id,
                considered = run.candidates_considered,
                "no rankable candidates this cycle"
            );
        }
        for (i, sc) in ranking.ranked.iter().enumerate() {
            tracing::info!(
                target: "orchestrator",
                rank = i + 1,
                score = sc.score,
                source = %sc.candidate.source,
                category = %sc.candidate.category,
                title = %sc.candidate.title,
                "selected"
            );
        }

        let enrich = self.config.include_affiliates;
        let per_topic: Vec<Vec<TopicResult>> = stream::iter(ranking.ranked)
            .map(|sc| {
                let languages = &languages;
                async move {
                    let hint = TrendHint::from(&sc.candidate);
                    self.run_languages(
                        &sc.candidate.title,
                        sc.candidate.category,
                        languages,
                        enrich,
                        Some(&hint),
                    )
                    .await
                }
            })
            .buffered(self.config.max_parallel_topics.max(1))
            .collect()
            .await;
        run.results = per_topic.into_iter().flatten().collect();

        Ok(self.finish(run, t0))
    }

    /// Manual-topic mode: same stage pipeline, no sources, no ranking.
    pub async fn run_for_topic(
        &self,
        topic_text: &str,
        category: Option<Category>,
        languages: &[String],
        enrich: bool,
    ) -> Result<PipelineRun, CycleError> {
        crate::metrics::ensure_metrics_described();
        let languages = self.languages(languages)?;
        self.pipeline.layout().prepare()?;

        let t0 = Instant::now();
        let mut run = PipelineRun::new(RunMode::Topic);
        let topic_text = topic_text.trim();
        let category = category.unwrap_or_else(|| topic::categorize(topic_text));
        tracing::info!(
            target: "orchestrator",
            run = %run.id,
            topic = topic_text,
            %category,
            languages = ?languages,
            "topic run started"
        );

        run.results = self
            .run_languages(topic_text, category, &languages, enrich, None)
            .await;
        Ok(self.finish(run, t0))
    }

    async fn run_languages(
        &self,
        topic: &str,
        category: Category,
        languages: &[String],
        enrich: bool,
        hint: Option<&TrendHint>,
    ) -> Vec<TopicResult> {
        join_all(
            languages
                .iter()
                .map(|lang| self.pipeline.run(topic, lang, category, enrich, hint)),
        )
        .await
    }

    fn languages(&self, requested: &[String]) -> Result<Vec<String>, CycleError> {
        let langs = crate::config::parse_languages(&requested.join(","));
        if langs.is_empty() {
            return Err(CycleError::NoLanguages);
        }
        Ok(langs)
    }

    /// Schedule feedback, record history and metrics, log the summary.
    fn finish(&self, run: PipelineRun, t0: Instant) -> PipelineRun {
        let feedback_task = if self.pipeline.test_mode() {
            None
        } else {
            self.scheduler.schedule(
                run.feedback_items(),
                Duration::from_secs(self.config.feedback_delay_secs),
            )
        };

        let summary = RunSummary::from_run(&run, feedback_task);
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("pipeline_cycle_ms").record(ms);
        counter!("pipeline_cycles_total", "outcome" => outcome_label(&summary)).increment(1);

        tracing::info!(
            target: "orchestrator",
            run = %run.id,
            outcome = ?summary.outcome,
            done = summary.done,
            failed = summary.failed,
            degraded_audio = summary.degraded_audio,
            failed_sources = summary.failed_sources.len(),
            feedback_task = ?feedback_task,
            ms = ms as u64,
            "run finished"
        );
        self.history.push(summary);
        run
    }
}

fn outcome_label(s: &RunSummary) -> &'static str {
    use crate::model::RunOutcome::*;
    match s.outcome {
        Empty => "empty",
        Complete => "complete",
        Partial => "partial",
        Failed => "failed",
    }
}
