// src/script/ollama.rs
//! Script generation through a local LLM HTTP endpoint (`/api/generate`).

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_prompt, into_artifact, parse_structured, ScriptGenerator};
use crate::config::ScriptConfig;
use crate::model::{Category, ScriptArtifact, TrendHint};

pub struct OllamaScriptGenerator {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f32,
}

impl OllamaScriptGenerator {
    pub fn new(cfg: &ScriptConfig, user_agent: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .context("building llm http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        })
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Options {
            temperature: f32,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: Options,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            response: String,
        }

        let req = Req {
            model: &self.model,
            prompt,
            stream: false,
            options: Options {
                temperature: self.temperature,
            },
        };
        let resp = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&req)
            .send()
            .await
            .context("llm request")?;
        let status = resp.status();
        if !status.is_success() {
            bail!("llm endpoint returned {status}");
        }
        let body: Resp = resp.json().await.context("decoding llm response")?;
        Ok(body.response)
    }
}

#[async_trait]
impl ScriptGenerator for OllamaScriptGenerator {
    async fn generate(
        &self,
        topic: &str,
        language: &str,
        category: Category,
        hint: Option<&TrendHint>,
    ) -> Result<ScriptArtifact> {
        let prompt = build_prompt(topic, language, category, hint);
        let raw = self.complete(&prompt).await?;
        if raw.trim().is_empty() {
            bail!("llm returned an empty script for `{topic}` ({language})");
        }
        tracing::debug!(target: "pipeline", topic, language, chars = raw.len(), "script completion received");
        Ok(into_artifact(topic, language, category, parse_structured(&raw)))
    }
}
