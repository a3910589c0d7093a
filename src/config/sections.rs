// src/config/sections.rs
//! Per-component configuration sections. Every field has a default so a
//! partial TOML file (or none at all) still yields a runnable config.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::AffiliateLink;
use crate::voice::settings::VoiceTable;

/// Synthesis cascade parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Max characters per primary-provider request.
    pub chunk_limit: usize,
    /// Length of the silent placeholder used when every provider failed.
    pub placeholder_secs: u32,
    pub placeholder_sample_rate: u32,
    pub primary: PrimaryVoiceConfig,
    pub secondary: SecondaryVoiceConfig,
    #[serde(flatten)]
    pub voices: VoiceTable,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            chunk_limit: 2500,
            placeholder_secs: 30,
            placeholder_sample_rate: 22_050,
            primary: PrimaryVoiceConfig::default(),
            secondary: SecondaryVoiceConfig::default(),
            voices: VoiceTable::default_seed(),
        }
    }
}

/// Network voice service (tier 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryVoiceConfig {
    /// `"ENV"` means: read `ELEVENLABS_API_KEY` at load time.
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for PrimaryVoiceConfig {
    fn default() -> Self {
        Self {
            api_key: "ENV".into(),
            base_url: "https://api.elevenlabs.io/v1".into(),
            timeout_secs: 60,
        }
    }
}

/// Local TTS command (tier 2). Text is piped on stdin, WAV read from stdout.
/// `{language}` in args is substituted with the language code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryVoiceConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for SecondaryVoiceConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".into(),
            args: vec![
                "-v".into(),
                "{language}".into(),
                "--stdin".into(),
                "--stdout".into(),
            ],
            timeout_secs: 120,
        }
    }
}

/// Candidate source adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub http_timeout_secs: u64,
    pub user_agent: String,

    pub trends_enabled: bool,
    pub trends_rss_url: String,

    pub video_enabled: bool,
    /// `"ENV"` means: read `YOUTUBE_API_KEY` at load time.
    pub video_api_key: String,
    pub video_api_url: String,
    pub video_region: String,
    pub video_category_id: String,
    pub video_max_results: u32,
    pub video_min_views: u64,

    pub forum_enabled: bool,
    pub forum_base_url: String,
    pub forum_communities: Vec<String>,
    pub forum_limit: u32,
    pub forum_min_score: i64,
    /// Minimum delay between consecutive calls to the forum source.
    pub forum_min_interval_ms: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: 10,
            user_agent: "content-pipeline/0.1 (trend discovery)".into(),

            trends_enabled: true,
            trends_rss_url: "https://trends.google.com/trending/rss?geo=US".into(),

            video_enabled: true,
            video_api_key: "ENV".into(),
            video_api_url: "https://www.googleapis.com/youtube/v3/videos".into(),
            video_region: "US".into(),
            video_category_id: "22".into(),
            video_max_results: 20,
            video_min_views: 100_000,

            forum_enabled: true,
            forum_base_url: "https://www.reddit.com".into(),
            forum_communities: [
                "entrepreneur",
                "investing",
                "technology",
                "LifeProTips",
                "personalfinance",
                "Python",
                "artificial",
                "Futurology",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            forum_limit: 10,
            forum_min_score: 100,
            forum_min_interval_ms: 500,
        }
    }
}

/// Local LLM endpoint used by the script generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            model: "mistral".into(),
            temperature: 0.7,
            timeout_secs: 180,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub ffmpeg_bin: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Hard cap on output length.
    pub max_duration_secs: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".into(),
            width: 1080,
            height: 1920,
            fps: 30,
            max_duration_secs: 60,
        }
    }
}

/// Per-category affiliate links (keys are category labels).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliateConfig {
    pub disclosure: String,
    pub links: BTreeMap<String, Vec<AffiliateLink>>,
}

impl Default for AffiliateConfig {
    fn default() -> Self {
        Self {
            disclosure: "Some links are affiliate links; we may earn a commission.".into(),
            links: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Published videos (plus metadata sidecars) land here.
    pub outbox_dir: PathBuf,
    /// Append-only JSONL log written by the feedback collector.
    pub feedback_log: PathBuf,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            outbox_dir: PathBuf::from("output/outbox"),
            feedback_log: PathBuf::from("logs/feedback.jsonl"),
        }
    }
}
