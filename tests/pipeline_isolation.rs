// tests/pipeline_isolation.rs
//
// Stage pipeline for single pairs: stage order, failure attribution, a
// panicking collaborator contained as a failed pair, and the script artifact
// persisted before later stages run.

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;

use content_pipeline::affiliate::CategoryAffiliates;
use content_pipeline::config::AffiliateConfig;
use content_pipeline::model::{Category, ScriptArtifact, Stage, UploadHandle};
use content_pipeline::pipeline::{StagePipeline, StageServices};
use content_pipeline::publish::{OutboxUploader, Uploader};
use content_pipeline::render::Renderer;
use content_pipeline::storage::{ArtifactKind, OutputLayout};

use common::{CannedScripts, FakeNarrator, FakeRenderer};

struct PanickingRenderer;

#[async_trait]
impl Renderer for PanickingRenderer {
    async fn render(
        &self,
        _script: &ScriptArtifact,
        _audio: &Path,
        _language: &str,
        _category: Category,
    ) -> Result<PathBuf> {
        panic!("encoder segfault simulation");
    }
}

struct RejectingUploader;

#[async_trait]
impl Uploader for RejectingUploader {
    async fn upload(&self, _v: &Path, _s: &ScriptArtifact, language: &str) -> Result<UploadHandle> {
        bail!("quota exceeded for {language}")
    }
}

fn pipeline(
    root: &Path,
    renderer: Arc<dyn Renderer>,
    uploader: Arc<dyn Uploader>,
    fail_voice: &[&str],
) -> (StagePipeline, OutputLayout) {
    let layout = OutputLayout::new(root.join("output"));
    let services = StageServices {
        scripts: Arc::new(CannedScripts::default()),
        enricher: Arc::new(CategoryAffiliates::from_config(&AffiliateConfig::default())),
        narrator: Arc::new(FakeNarrator::new(layout.clone(), fail_voice)),
        renderer,
        uploader,
    };
    (StagePipeline::new(services, layout.clone(), false), layout)
}

#[tokio::test]
async fn en_and_de_run_independently() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(tmp.path().join("output"));
    let (p, _) = pipeline(
        tmp.path(),
        Arc::new(FakeRenderer::new(layout)),
        Arc::new(OutboxUploader::new(tmp.path().join("outbox"))),
        &["de"],
    );

    let (en, de) = tokio::join!(
        p.run("Budget tips", "en", Category::Finance, true, None),
        p.run("Budget tips", "de", Category::Finance, true, None),
    );

    let set = en.artifacts().expect("en done");
    assert_eq!(set.script.language, "en");
    assert!(set.upload.is_some());

    let err = de.error().expect("de failed");
    assert_eq!(err.stage, Stage::Voice);
}

#[tokio::test]
async fn panicking_renderer_is_a_render_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let (p, layout) = pipeline(
        tmp.path(),
        Arc::new(PanickingRenderer),
        Arc::new(OutboxUploader::new(tmp.path().join("outbox"))),
        &[],
    );

    let r = p.run("GPU prices", "en", Category::Tech, false, None).await;
    let err = r.error().expect("failed pair");
    assert_eq!(err.stage, Stage::Render);
    assert!(err.message.contains("encoder segfault simulation"));

    // Script and audio from the earlier stages are on disk.
    assert_eq!(layout.list(ArtifactKind::Scripts).unwrap().len(), 1);
    assert_eq!(layout.list(ArtifactKind::Audio).unwrap().len(), 1);
}

#[tokio::test]
async fn upload_failure_is_attributed_to_upload() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(tmp.path().join("output"));
    let (p, _) = pipeline(
        tmp.path(),
        Arc::new(FakeRenderer::new(layout)),
        Arc::new(RejectingUploader),
        &[],
    );

    let r = p.run("Study hacks", "ko", Category::Education, false, None).await;
    let err = r.error().expect("failed pair");
    assert_eq!(err.stage, Stage::Upload);
    assert!(err.message.contains("quota exceeded for ko"));
    assert_eq!(r.topic, "Study hacks");
    assert_eq!(r.language, "ko");
}
