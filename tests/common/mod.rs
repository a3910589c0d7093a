// tests/common/mod.rs
//
// Mock collaborators shared by the integration tests. Each mock keeps a call
// log behind a parking_lot::Mutex so tests can assert on what ran.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use content_pipeline::affiliate::CategoryAffiliates;
use content_pipeline::config::{AffiliateConfig, PipelineConfig};
use content_pipeline::feedback::{FeedbackScheduler, MetricsCollector};
use content_pipeline::history::History;
use content_pipeline::ingest::types::CandidateSource;
use content_pipeline::model::{
    Candidate, Category, ScriptArtifact, SynthesizedAudio, TrendHint, UploadHandle,
};
use content_pipeline::orchestrator::CycleOrchestrator;
use content_pipeline::pipeline::{StagePipeline, StageServices};
use content_pipeline::publish::OutboxUploader;
use content_pipeline::render::Renderer;
use content_pipeline::script::{into_artifact, parse_structured, ScriptGenerator};
use content_pipeline::storage::{topic_tag, ArtifactKind, OutputLayout};
use content_pipeline::voice::Narrator;

/// A source that returns a fixed list.
pub struct StaticSource {
    pub name: &'static str,
    pub items: Vec<Candidate>,
}

#[async_trait]
impl CandidateSource for StaticSource {
    async fn fetch(&self) -> Result<Vec<Candidate>> {
        Ok(self.items.clone())
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct DownSource;

#[async_trait]
impl CandidateSource for DownSource {
    async fn fetch(&self) -> Result<Vec<Candidate>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &'static str {
        "down"
    }
}

/// Canned structured LLM answer, parsed by the real parser.
#[derive(Default)]
pub struct CannedScripts {
    pub calls: Mutex<Vec<(String, String, Option<TrendHint>)>>,
}

#[async_trait]
impl ScriptGenerator for CannedScripts {
    async fn generate(
        &self,
        topic: &str,
        language: &str,
        category: Category,
        hint: Option<&TrendHint>,
    ) -> Result<ScriptArtifact> {
        self.calls
            .lock()
            .push((topic.to_string(), language.to_string(), hint.cloned()));
        let raw = format!(
            "TITLE: {topic}\nHOOK: Did you know this?\nMAIN_CONTENT: 1. First point here. 2. Second point here.\nCTA: Follow for more.\nDESCRIPTION: All about {topic}.\nTAGS: #one, #two"
        );
        Ok(into_artifact(topic, language, category, parse_structured(&raw)))
    }
}

/// Writes a small audio file; fails for the listed languages.
pub struct FakeNarrator {
    pub layout: OutputLayout,
    pub fail_languages: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeNarrator {
    pub fn new(layout: OutputLayout, fail_languages: &[&str]) -> Self {
        Self {
            layout,
            fail_languages: fail_languages.iter().map(|s| s.to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Narrator for FakeNarrator {
    async fn narrate(&self, script: &ScriptArtifact) -> Result<SynthesizedAudio> {
        self.calls.lock().push(script.language.clone());
        if self.fail_languages.contains(&script.language) {
            return Err(anyhow!("voice service rejected {}", script.language));
        }
        let path = self.layout.artifact_path(
            ArtifactKind::Audio,
            "voice",
            &script.language,
            &topic_tag(&script.topic),
            "mp3",
        );
        write_file(&path, b"ID3fake")?;
        Ok(SynthesizedAudio {
            path,
            degraded: false,
            placeholder_secs: None,
            attempts: Vec::new(),
        })
    }
}

/// Copies the audio into a fake mp4.
pub struct FakeRenderer {
    pub layout: OutputLayout,
    pub calls: Mutex<Vec<String>>,
}

impl FakeRenderer {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(
        &self,
        script: &ScriptArtifact,
        audio: &Path,
        language: &str,
        _category: Category,
    ) -> Result<PathBuf> {
        self.calls.lock().push(language.to_string());
        assert!(audio.exists(), "renderer got a missing audio file");
        let path = self.layout.artifact_path(
            ArtifactKind::Videos,
            "video",
            language,
            &topic_tag(&script.topic),
            "mp4",
        );
        write_file(&path, b"fake mp4")?;
        Ok(path)
    }
}

#[derive(Default)]
pub struct RecordingCollector {
    pub seen: Mutex<Vec<String>>,
}

#[async_trait]
impl MetricsCollector for RecordingCollector {
    async fn collect(&self, upload: &UploadHandle, _script: &ScriptArtifact) -> Result<()> {
        self.seen.lock().push(upload.id.clone());
        Ok(())
    }
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Fully wired orchestrator over mocks, plus handles to inspect them.
pub struct Harness {
    pub orchestrator: CycleOrchestrator,
    pub scripts: Arc<CannedScripts>,
    pub narrator: Arc<FakeNarrator>,
    pub renderer: Arc<FakeRenderer>,
    pub collector: Arc<RecordingCollector>,
    pub scheduler: Arc<FeedbackScheduler>,
    pub history: Arc<History>,
    pub layout: OutputLayout,
}

pub fn harness(
    root: &Path,
    cfg: PipelineConfig,
    sources: Vec<Arc<dyn CandidateSource>>,
    fail_voice: &[&str],
) -> Harness {
    let layout = OutputLayout::new(root.join("output"));
    let scripts = Arc::new(CannedScripts::default());
    let narrator = Arc::new(FakeNarrator::new(layout.clone(), fail_voice));
    let renderer = Arc::new(FakeRenderer::new(layout.clone()));
    let collector = Arc::new(RecordingCollector::default());

    let services = StageServices {
        scripts: scripts.clone(),
        enricher: Arc::new(CategoryAffiliates::from_config(&AffiliateConfig::default())),
        narrator: narrator.clone(),
        renderer: renderer.clone(),
        uploader: Arc::new(OutboxUploader::new(root.join("outbox"))),
    };
    let pipeline = Arc::new(StagePipeline::new(services, layout.clone(), cfg.test_mode));
    let scheduler = Arc::new(FeedbackScheduler::new(collector.clone()));
    let history = Arc::new(History::with_capacity(16));
    let orchestrator = CycleOrchestrator::new(
        Arc::new(cfg),
        sources,
        pipeline,
        scheduler.clone(),
        history.clone(),
    );

    Harness {
        orchestrator,
        scripts,
        narrator,
        renderer,
        collector,
        scheduler,
        history,
        layout,
    }
}

pub fn candidate(
    title: &str,
    category: Category,
    source: content_pipeline::model::SourceKind,
    raw_metric: f64,
    confidence: f64,
) -> Candidate {
    Candidate::new(title, category, source, raw_metric, confidence)
}
