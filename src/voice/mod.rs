// src/voice/mod.rs
//! # Synthesis Cascade
//! Text + language + style → audio artifact, trying providers in order:
//!
//! 1. primary (network service), text chunked and concatenated
//! 2. secondary (local command), single shot
//! 3. silent WAV placeholder, marked `degraded`
//!
//! Tier failures are recorded in the attempt trail and never propagate.
//! Only a failure to write the placeholder escapes, as `io::Error`.

pub mod chunk;
pub mod command;
pub mod elevenlabs;
pub mod settings;
pub mod silence;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;

pub use settings::{VoiceSettings, VoiceTable};

use crate::config::SynthesisConfig;
use crate::model::{
    AttemptOutcome, FailureKind, ScriptArtifact, SynthesisAttempt, SynthesizedAudio,
};
use crate::storage::{topic_tag, write_atomic, ArtifactKind, OutputLayout};

/// A speech provider. Returns raw audio bytes for one piece of text.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    async fn synthesize_chunk(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>>;
    fn name(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
    /// `false` when credentials or the binary are missing; the tier is then
    /// skipped without a call.
    fn is_configured(&self) -> bool {
        true
    }
}

/// Voice stage contract: script in, audio artifact out.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, script: &ScriptArtifact) -> Result<SynthesizedAudio>;
}

pub struct SynthesisCascade {
    primary: Arc<dyn VoiceProvider>,
    secondary: Arc<dyn VoiceProvider>,
    voices: VoiceTable,
    layout: OutputLayout,
    chunk_limit: usize,
    placeholder_secs: u32,
    sample_rate: u32,
}

impl SynthesisCascade {
    pub fn new(
        primary: Arc<dyn VoiceProvider>,
        secondary: Arc<dyn VoiceProvider>,
        cfg: &SynthesisConfig,
        layout: OutputLayout,
    ) -> Self {
        Self {
            primary,
            secondary,
            voices: cfg.voices.clone(),
            layout,
            chunk_limit: cfg.chunk_limit.max(1),
            placeholder_secs: cfg.placeholder_secs,
            sample_rate: cfg.placeholder_sample_rate.max(1),
        }
    }

    pub async fn synthesize(
        &self,
        text: &str,
        language: &str,
        style: &str,
    ) -> io::Result<SynthesizedAudio> {
        self.synthesize_tagged(text, language, style, &topic_tag(text))
            .await
    }

    /// Same as [`synthesize`](Self::synthesize) with an explicit file tag.
    pub async fn synthesize_tagged(
        &self,
        text: &str,
        language: &str,
        style: &str,
        tag: &str,
    ) -> io::Result<SynthesizedAudio> {
        let settings = self.voices.resolve(language, style);
        let mut attempts: Vec<SynthesisAttempt> = Vec::with_capacity(3);

        // Tier 1: chunked.
        let chunks = chunk::split_into_chunks(text, self.chunk_limit);
        let primary = self.try_primary(&chunks, &settings).await;
        if let Some(path) = self
            .record(1, &*self.primary, primary, "voice", language, tag, &mut attempts)
            .await
        {
            return Ok(done(path, attempts));
        }

        // Tier 2: single shot.
        let secondary = self.try_single(&*self.secondary, text, &settings).await;
        if let Some(path) = self
            .record(
                2,
                &*self.secondary,
                secondary,
                "voice_fallback",
                language,
                tag,
                &mut attempts,
            )
            .await
        {
            return Ok(done(path, attempts));
        }

        // Tier 3: placeholder.
        let path = self.layout.artifact_path(
            ArtifactKind::Audio,
            "voice_silent",
            language,
            tag,
            "wav",
        );
        write_atomic(&path, &silence::silent_wav(self.placeholder_secs, self.sample_rate)).await?;
        counter!("synthesis_tier_total", "tier" => "3").increment(1);
        tracing::warn!(
            target: "voice",
            language,
            secs = self.placeholder_secs,
            path = %path.display(),
            "all voice providers failed, using silent placeholder"
        );
        attempts.push(SynthesisAttempt {
            tier: 3,
            provider: "silence".into(),
            outcome: AttemptOutcome::Success { path: path.clone() },
        });
        Ok(SynthesizedAudio {
            path,
            degraded: true,
            placeholder_secs: Some(self.placeholder_secs),
            attempts,
        })
    }

    async fn try_primary(
        &self,
        chunks: &[String],
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, (FailureKind, String)> {
        if !self.primary.is_configured() {
            return Err((FailureKind::Unconfigured, "provider not configured".into()));
        }
        if chunks.is_empty() {
            return Err((FailureKind::Empty, "nothing to synthesize".into()));
        }
        let mut audio = Vec::new();
        for (i, c) in chunks.iter().enumerate() {
            let bytes = self
                .primary
                .synthesize_chunk(c, settings)
                .await
                .map_err(|e| {
                    (
                        FailureKind::Provider,
                        format!("chunk {}/{}: {e:#}", i + 1, chunks.len()),
                    )
                })?;
            if bytes.is_empty() {
                return Err((
                    FailureKind::Empty,
                    format!("chunk {}/{} returned no audio", i + 1, chunks.len()),
                ));
            }
            audio.extend_from_slice(&bytes);
        }
        Ok(audio)
    }

    async fn try_single(
        &self,
        provider: &dyn VoiceProvider,
        text: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, (FailureKind, String)> {
        if !provider.is_configured() {
            return Err((FailureKind::Unconfigured, "provider not configured".into()));
        }
        if text.trim().is_empty() {
            return Err((FailureKind::Empty, "nothing to synthesize".into()));
        }
        match provider.synthesize_chunk(text.trim(), settings).await {
            Ok(bytes) if bytes.is_empty() => {
                Err((FailureKind::Empty, "provider returned no audio".into()))
            }
            Ok(bytes) => Ok(bytes),
            Err(e) => Err((FailureKind::Provider, format!("{e:#}"))),
        }
    }

    /// Persist a tier's audio and append the attempt. Returns the path on success.
    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        tier: u8,
        provider: &dyn VoiceProvider,
        result: Result<Vec<u8>, (FailureKind, String)>,
        prefix: &str,
        language: &str,
        tag: &str,
        attempts: &mut Vec<SynthesisAttempt>,
    ) -> Option<PathBuf> {
        let outcome = match result {
            Ok(bytes) => {
                let path = self.layout.artifact_path(
                    ArtifactKind::Audio,
                    prefix,
                    language,
                    tag,
                    provider.file_extension(),
                );
                match write_atomic(&path, &bytes).await {
                    Ok(()) => AttemptOutcome::Success { path },
                    Err(e) => AttemptOutcome::Failure {
                        kind: FailureKind::Io,
                        message: format!("writing {}: {e}", path.display()),
                    },
                }
            }
            Err((kind, message)) => AttemptOutcome::Failure { kind, message },
        };

        let tier_label = tier.to_string();
        match &outcome {
            AttemptOutcome::Success { path } => {
                counter!("synthesis_tier_total", "tier" => tier_label).increment(1);
                tracing::info!(
                    target: "voice",
                    tier,
                    provider = provider.name(),
                    language,
                    path = %path.display(),
                    "synthesized"
                );
            }
            AttemptOutcome::Failure { kind, message } => {
                tracing::warn!(
                    target: "voice",
                    tier,
                    provider = provider.name(),
                    language,
                    ?kind,
                    %message,
                    "voice tier failed"
                );
            }
        }

        let path = match &outcome {
            AttemptOutcome::Success { path } => Some(path.clone()),
            AttemptOutcome::Failure { .. } => None,
        };
        attempts.push(SynthesisAttempt {
            tier,
            provider: provider.name().to_string(),
            outcome,
        });
        path
    }
}

fn done(path: PathBuf, attempts: Vec<SynthesisAttempt>) -> SynthesizedAudio {
    SynthesizedAudio {
        path,
        degraded: false,
        placeholder_secs: None,
        attempts,
    }
}

#[async_trait]
impl Narrator for SynthesisCascade {
    async fn narrate(&self, script: &ScriptArtifact) -> Result<SynthesizedAudio> {
        let audio = self
            .synthesize_tagged(
                &script.content,
                &script.language,
                &script.voice_style,
                &topic_tag(&script.topic),
            )
            .await?;
        Ok(audio)
    }
}
