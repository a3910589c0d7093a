// src/config/mod.rs
//! Pipeline configuration.
//!
//! Resolution order for the file:
//! 1) explicit path (`--config`)
//! 2) `$PIPELINE_CONFIG_PATH`
//! 3) `config/pipeline.toml`
//! 4) built-in defaults
//!
//! Secrets may be written as the literal `"ENV"` and are then read from the
//! process environment here, once. Nothing downstream touches env vars.

pub mod sections;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub use sections::{
    AffiliateConfig, PrimaryVoiceConfig, PublishConfig, RenderConfig, ScriptConfig,
    SecondaryVoiceConfig, SourcesConfig, SynthesisConfig,
};

use crate::ranking::ScoringTables;

pub const ENV_PATH: &str = "PIPELINE_CONFIG_PATH";
pub const DEFAULT_PATH: &str = "config/pipeline.toml";
const VOICE_KEY_ENV: &str = "ELEVENLABS_API_KEY";
const VIDEO_KEY_ENV: &str = "YOUTUBE_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    /// Target languages, processed concurrently per topic.
    pub languages: Vec<String>,
    /// Topics taken from the ranking per cycle.
    pub daily_count: usize,
    pub cycle_interval_secs: u64,
    pub feedback_delay_secs: u64,
    pub max_parallel_topics: usize,
    /// Affiliate enrichment for ranked (trending) topics.
    pub include_affiliates: bool,
    /// Skip publishing and feedback.
    pub test_mode: bool,
    /// Bind address of the status router in continuous mode, e.g. "127.0.0.1:8080".
    pub status_addr: Option<String>,

    pub scoring: ScoringTables,
    pub synthesis: SynthesisConfig,
    pub sources: SourcesConfig,
    pub script: ScriptConfig,
    pub render: RenderConfig,
    pub affiliates: AffiliateConfig,
    pub publish: PublishConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            log_file: PathBuf::from("logs/system.log"),
            languages: vec!["en".into()],
            daily_count: 3,
            cycle_interval_secs: 86_400,
            feedback_delay_secs: 7_200,
            max_parallel_topics: 2,
            include_affiliates: true,
            test_mode: false,
            status_addr: None,
            scoring: ScoringTables::default(),
            synthesis: SynthesisConfig::default(),
            sources: SourcesConfig::default(),
            script: ScriptConfig::default(),
            render: RenderConfig::default(),
            affiliates: AffiliateConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse + sanitize, without resolving secrets.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: PipelineConfig = toml::from_str(s).context("parsing pipeline config")?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading pipeline config from {}", path.display()))?;
        let mut cfg = Self::from_toml_str(&data)?;
        cfg.resolve_secrets();
        Ok(cfg)
    }

    /// Explicit path, then `$PIPELINE_CONFIG_PATH`, then `config/pipeline.toml`,
    /// then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(p) = explicit {
            return Self::load_from_file(p);
        }
        if let Ok(p) = std::env::var(ENV_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_PATH} points to non-existent path"));
            }
            return Self::load_from_file(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_PATH);
        if default_p.exists() {
            return Self::load_from_file(&default_p);
        }
        tracing::info!(target: "config", "no config file found, using defaults");
        let mut cfg = Self::default();
        cfg.resolve_secrets();
        Ok(cfg)
    }

    /// Replace `"ENV"` secrets with their environment values. A missing
    /// variable leaves the secret empty; the provider then reports itself
    /// unconfigured instead of failing startup.
    pub fn resolve_secrets(&mut self) {
        resolve_env(&mut self.synthesis.primary.api_key, VOICE_KEY_ENV);
        resolve_env(&mut self.sources.video_api_key, VIDEO_KEY_ENV);
    }

    fn sanitize(&mut self) {
        let mut langs: Vec<String> = Vec::new();
        for l in self.languages.drain(..) {
            let l = l.trim().to_ascii_lowercase();
            if !l.is_empty() && !langs.contains(&l) {
                langs.push(l);
            }
        }
        if langs.is_empty() {
            langs.push("en".into());
        }
        self.languages = langs;

        self.max_parallel_topics = self.max_parallel_topics.max(1);
        if self.synthesis.chunk_limit == 0 {
            self.synthesis.chunk_limit = SynthesisConfig::default().chunk_limit;
        }
        if self.synthesis.placeholder_sample_rate == 0 {
            self.synthesis.placeholder_sample_rate =
                SynthesisConfig::default().placeholder_sample_rate;
        }
        if !(0.0..=2.0).contains(&self.script.temperature) {
            self.script.temperature = ScriptConfig::default().temperature;
        }
        if self.render.fps == 0 {
            self.render.fps = RenderConfig::default().fps;
        }
    }
}

fn resolve_env(slot: &mut String, var: &str) {
    if !slot.trim().eq_ignore_ascii_case("env") {
        return;
    }
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => *slot = v.trim().to_string(),
        _ => {
            tracing::warn!(target: "config", var, "secret set to ENV but variable is missing");
            slot.clear();
        }
    }
}

/// Split a comma separated language list ("en, de,,KO") into codes.
pub fn parse_languages(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in s.split(',') {
        let code = part.trim().to_ascii_lowercase();
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}
