// src/voice/elevenlabs.rs
//! Network voice service (tier 1). One POST per chunk, MP3 bytes back.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Serialize;

use super::{VoiceProvider, VoiceSettings};
use crate::config::PrimaryVoiceConfig;

pub struct ElevenLabsProvider {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsProvider {
    pub fn new(cfg: &PrimaryVoiceConfig, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .context("building voice service http client")?;
        Ok(Self {
            http,
            api_key: cfg.api_key.trim().to_string(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/text-to-speech/{}", self.base_url, voice_id)
    }
}

#[derive(Serialize)]
struct Req<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: Settings,
}

#[derive(Serialize)]
struct Settings {
    stability: f32,
    similarity_boost: f32,
    style: f32,
    use_speaker_boost: bool,
}

#[async_trait]
impl VoiceProvider for ElevenLabsProvider {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn file_extension(&self) -> &'static str {
        "mp3"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn synthesize_chunk(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>> {
        if settings.voice_id.is_empty() {
            bail!("no voice id for language `{}`", settings.language);
        }
        let req = Req {
            text,
            model_id: &settings.model_id,
            voice_settings: Settings {
                stability: settings.stability,
                similarity_boost: settings.similarity_boost,
                style: settings.style,
                use_speaker_boost: settings.use_speaker_boost,
            },
        };
        let resp = self
            .http
            .post(self.endpoint(&settings.voice_id))
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&req)
            .send()
            .await
            .context("voice service request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            bail!("voice service returned {status}: {snippet}");
        }
        let bytes = resp.bytes().await.context("reading voice service body")?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_without_key() {
        let cfg = PrimaryVoiceConfig {
            api_key: "  ".into(),
            ..PrimaryVoiceConfig::default()
        };
        let p = ElevenLabsProvider::new(&cfg, "test").unwrap();
        assert!(!p.is_configured());
        assert_eq!(
            p.endpoint("abc"),
            "https://api.elevenlabs.io/v1/text-to-speech/abc"
        );
    }
}
