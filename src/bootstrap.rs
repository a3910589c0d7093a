// src/bootstrap.rs
//! Wires concrete collaborators from a loaded [`PipelineConfig`].

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::affiliate::CategoryAffiliates;
use crate::config::PipelineConfig;
use crate::feedback::{FeedbackLog, FeedbackScheduler};
use crate::history::History;
use crate::ingest::providers::{
    forum_hot::ForumHotProvider, http_client, trends_rss::TrendsRssProvider,
    video_trending::VideoTrendingProvider,
};
use crate::ingest::types::CandidateSource;
use crate::orchestrator::CycleOrchestrator;
use crate::pipeline::{StagePipeline, StageServices};
use crate::publish::OutboxUploader;
use crate::render::ffmpeg::FfmpegRenderer;
use crate::script::ollama::OllamaScriptGenerator;
use crate::storage::OutputLayout;
use crate::voice::{command::CommandProvider, elevenlabs::ElevenLabsProvider, SynthesisCascade};

const HISTORY_CAPACITY: usize = 200;

pub struct PipelineRuntime {
    pub orchestrator: Arc<CycleOrchestrator>,
    pub scheduler: Arc<FeedbackScheduler>,
    pub history: Arc<History>,
    pub layout: OutputLayout,
}

impl PipelineRuntime {
    pub fn from_config(cfg: PipelineConfig) -> Result<Self> {
        let cfg = Arc::new(cfg);
        let layout = OutputLayout::new(&cfg.output_dir);
        let sources = build_sources(&cfg)?;

        // Safe diagnostics only: no key material, just whether it is present.
        info!(
            target: "bootstrap",
            sources = sources.len(),
            languages = ?cfg.languages,
            voice_key = !cfg.synthesis.primary.api_key.is_empty(),
            video_key = !cfg.sources.video_api_key.is_empty(),
            test_mode = cfg.test_mode,
            "pipeline config loaded"
        );

        let ua = cfg.sources.user_agent.as_str();
        let primary = Arc::new(ElevenLabsProvider::new(&cfg.synthesis.primary, ua)?);
        let secondary = Arc::new(CommandProvider::new(&cfg.synthesis.secondary));
        let narrator = Arc::new(SynthesisCascade::new(
            primary,
            secondary,
            &cfg.synthesis,
            layout.clone(),
        ));

        let services = StageServices {
            scripts: Arc::new(OllamaScriptGenerator::new(&cfg.script, ua)?),
            enricher: Arc::new(CategoryAffiliates::from_config(&cfg.affiliates)),
            narrator,
            renderer: Arc::new(FfmpegRenderer::new(cfg.render.clone(), layout.clone())),
            uploader: Arc::new(OutboxUploader::new(&cfg.publish.outbox_dir)),
        };
        let pipeline = Arc::new(StagePipeline::new(services, layout.clone(), cfg.test_mode));

        let collector = Arc::new(FeedbackLog::new(&cfg.publish.feedback_log));
        let scheduler = Arc::new(FeedbackScheduler::new(collector));
        let history = Arc::new(History::with_capacity(HISTORY_CAPACITY));

        let orchestrator = Arc::new(CycleOrchestrator::new(
            cfg,
            sources,
            pipeline,
            scheduler.clone(),
            history.clone(),
        ));

        Ok(Self {
            orchestrator,
            scheduler,
            history,
            layout,
        })
    }
}

/// Enabled sources only. A video source without a key is still built; it
/// fails at fetch time and shows up in the run's failed sources.
pub fn build_sources(cfg: &PipelineConfig) -> Result<Vec<Arc<dyn CandidateSource>>> {
    let s = &cfg.sources;
    let client = http_client(s)?;
    let mut out: Vec<Arc<dyn CandidateSource>> = Vec::new();

    if s.trends_enabled {
        out.push(Arc::new(TrendsRssProvider::from_url(
            s.trends_rss_url.clone(),
            client.clone(),
        )));
    }
    if s.video_enabled {
        if s.video_api_key.is_empty() {
            warn!(target: "bootstrap", "video source enabled without an API key");
        }
        out.push(Arc::new(VideoTrendingProvider::from_config(s, client.clone())));
    }
    if s.forum_enabled {
        out.push(Arc::new(ForumHotProvider::from_config(s, client)));
    }
    Ok(out)
}
