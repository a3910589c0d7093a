//! # Stage Pipeline
//! script → enrich → voice → render → upload for one (topic, language) pair.
//!
//! Stages run strictly in order and the first failure stops the pair. The
//! result is always a [`TopicResult`]; nothing escapes to sibling pairs, not
//! even a panicking collaborator.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use metrics::counter;

use crate::affiliate::AffiliateEnricher;
use crate::error::StageFailure;
use crate::model::{
    Category, ScriptArtifact, Stage, StageArtifactSet, TopicOutcome, TopicResult, TrendHint,
};
use crate::publish::Uploader;
use crate::render::Renderer;
use crate::script::ScriptGenerator;
use crate::storage::{topic_tag, ArtifactKind, OutputLayout};
use crate::voice::Narrator;

/// Collaborators of the stage pipeline.
#[derive(Clone)]
pub struct StageServices {
    pub scripts: Arc<dyn ScriptGenerator>,
    pub enricher: Arc<dyn AffiliateEnricher>,
    pub narrator: Arc<dyn Narrator>,
    pub renderer: Arc<dyn Renderer>,
    pub uploader: Arc<dyn Uploader>,
}

/// Progress of one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Scripted,
    Enriched,
    Voiced,
    Rendered,
    Uploaded,
    Done,
}

pub struct StagePipeline {
    services: StageServices,
    layout: OutputLayout,
    test_mode: bool,
}

impl StagePipeline {
    pub fn new(services: StageServices, layout: OutputLayout, test_mode: bool) -> Self {
        Self {
            services,
            layout,
            test_mode,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub async fn run(
        &self,
        topic: &str,
        language: &str,
        category: Category,
        enrich: bool,
        hint: Option<&TrendHint>,
    ) -> TopicResult {
        let mut reached = Stage::Script;
        let res = AssertUnwindSafe(self.run_stages(
            topic,
            language,
            category,
            enrich,
            hint,
            &mut reached,
        ))
        .catch_unwind()
        .await;

        let outcome = match res {
            Ok(Ok(set)) => TopicOutcome::Done(set),
            Ok(Err(failure)) => TopicOutcome::Failed(self.failed(topic, language, failure)),
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                let failure = StageFailure::new(reached, format!("panicked: {msg}"));
                TopicOutcome::Failed(self.failed(topic, language, failure))
            }
        };

        TopicResult {
            topic: topic.to_string(),
            language: language.to_string(),
            category,
            outcome,
        }
    }

    fn failed(&self, topic: &str, language: &str, f: StageFailure) -> crate::model::ErrorRecord {
        tracing::warn!(
            target: "pipeline",
            topic,
            language,
            stage = %f.stage,
            reason = %f.reason,
            "pair failed"
        );
        counter!("pipeline_stage_failures_total", "stage" => f.stage.as_str()).increment(1);
        f.into()
    }

    async fn run_stages(
        &self,
        topic: &str,
        language: &str,
        category: Category,
        enrich: bool,
        hint: Option<&TrendHint>,
        reached: &mut Stage,
    ) -> Result<StageArtifactSet, StageFailure> {
        let tag = topic_tag(topic);
        let s = &self.services;

        *reached = Stage::Script;
        let script = s
            .scripts
            .generate(topic, language, category, hint)
            .await
            .map_err(|e| StageFailure::from_anyhow(Stage::Script, &e))?;
        let mut script = normalize_script(script, topic, language, category);
        let path = self
            .layout
            .write_json(ArtifactKind::Scripts, "script", language, &tag, &script)
            .await
            .map_err(|e| StageFailure::new(Stage::Script, format!("persisting script: {e}")))?;
        transition(topic, language, PairState::Scripted);
        tracing::debug!(target: "pipeline", path = %path.display(), "script saved");

        *reached = Stage::Enrich;
        if enrich {
            script = s.enricher.enrich(script, category);
        }
        transition(topic, language, PairState::Enriched);

        *reached = Stage::Voice;
        let audio = s
            .narrator
            .narrate(&script)
            .await
            .map_err(|e| StageFailure::from_anyhow(Stage::Voice, &e))?;
        if audio.degraded {
            tracing::warn!(target: "pipeline", topic, language, "continuing with placeholder audio");
        }
        transition(topic, language, PairState::Voiced);

        *reached = Stage::Render;
        let video_path = s
            .renderer
            .render(&script, &audio.path, language, category)
            .await
            .map_err(|e| StageFailure::from_anyhow(Stage::Render, &e))?;
        transition(topic, language, PairState::Rendered);

        *reached = Stage::Upload;
        let upload = if self.test_mode {
            tracing::info!(target: "pipeline", topic, language, "test mode: upload skipped");
            None
        } else {
            let handle = s
                .uploader
                .upload(&video_path, &script, language)
                .await
                .map_err(|e| StageFailure::from_anyhow(Stage::Upload, &e))?;
            transition(topic, language, PairState::Uploaded);
            Some(handle)
        };

        transition(topic, language, PairState::Done);
        Ok(StageArtifactSet {
            script,
            audio,
            video_path,
            upload,
        })
    }
}

/// The generator owns the text; the pair owns the keys.
fn normalize_script(
    mut script: ScriptArtifact,
    topic: &str,
    language: &str,
    category: Category,
) -> ScriptArtifact {
    script.topic = topic.to_string();
    script.language = language.to_string();
    script.category = category;
    script
}

fn transition(topic: &str, language: &str, state: PairState) {
    tracing::debug!(target: "pipeline", topic, language, ?state, "state");
}

fn panic_message(p: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".into()
    }
}
