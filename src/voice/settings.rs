// src/voice/settings.rs
//! Per-language voice profiles and named style presets.
//!
//! Resolution: language profile (unknown language → `en`), then the style
//! preset overrides the expressive parameters. Unknown styles keep the
//! profile untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const FALLBACK_LANGUAGE: &str = "en";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub voice_id: String,
    #[serde(default = "default_model_id")]
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    #[serde(default)]
    pub style: f32,
    #[serde(default = "default_true")]
    pub use_speaker_boost: bool,
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".into()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StylePreset {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
}

/// Settings handed to every provider call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceSettings {
    pub language: String,
    pub voice_id: String,
    pub model_id: String,
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceTable {
    pub voices: BTreeMap<String, VoiceProfile>,
    pub styles: BTreeMap<String, StylePreset>,
}

impl Default for VoiceTable {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl VoiceTable {
    /// Built-in table for en/de/ko/zh and the five standard styles.
    pub fn default_seed() -> Self {
        let mut voices = BTreeMap::new();
        for (lang, voice_id, stability, similarity, style) in [
            ("en", "21m00Tcm4TlvDq8ikWAM", 0.75, 0.75, 0.0),
            ("de", "pNInz6obpgDQGcFmaJgB", 0.80, 0.70, 0.0),
            ("ko", "Xb7hH8MSUJpSbSDYk0k2", 0.70, 0.80, 0.1),
            ("zh", "XB0fDUnXU5powFXDhCwa", 0.75, 0.75, 0.0),
        ] {
            voices.insert(
                lang.to_string(),
                VoiceProfile {
                    voice_id: voice_id.into(),
                    model_id: default_model_id(),
                    stability,
                    similarity_boost: similarity,
                    style,
                    use_speaker_boost: true,
                },
            );
        }

        let mut styles = BTreeMap::new();
        for (name, stability, similarity, style) in [
            ("professional", 0.80, 0.75, 0.0),
            ("energetic", 0.60, 0.80, 0.4),
            ("calm", 0.90, 0.70, 0.0),
            ("friendly", 0.70, 0.80, 0.2),
            ("formal", 0.85, 0.75, 0.0),
        ] {
            styles.insert(
                name.to_string(),
                StylePreset {
                    stability,
                    similarity_boost: similarity,
                    style,
                },
            );
        }

        Self { voices, styles }
    }

    pub fn resolve(&self, language: &str, style: &str) -> VoiceSettings {
        let lang = language.trim().to_ascii_lowercase();
        let profile = self
            .voices
            .get(&lang)
            .or_else(|| self.voices.get(FALLBACK_LANGUAGE))
            .cloned()
            .unwrap_or_else(|| VoiceProfile {
                voice_id: String::new(),
                model_id: default_model_id(),
                stability: 0.75,
                similarity_boost: 0.75,
                style: 0.0,
                use_speaker_boost: true,
            });

        let mut out = VoiceSettings {
            language: lang,
            voice_id: profile.voice_id,
            model_id: profile.model_id,
            stability: clamp01(profile.stability),
            similarity_boost: clamp01(profile.similarity_boost),
            style: clamp01(profile.style),
            use_speaker_boost: profile.use_speaker_boost,
        };

        if let Some(p) = self.styles.get(&style.trim().to_ascii_lowercase()) {
            out.stability = clamp01(p.stability);
            out.similarity_boost = clamp01(p.similarity_boost);
            out.style = clamp01(p.style);
        }
        out
    }
}

fn clamp01(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_and_style() {
        let t = VoiceTable::default_seed();
        let s = t.resolve("DE", "energetic");
        assert_eq!(s.language, "de");
        assert_eq!(s.voice_id, "pNInz6obpgDQGcFmaJgB");
        assert_eq!(s.stability, 0.60);
        assert_eq!(s.style, 0.4);
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let t = VoiceTable::default_seed();
        let s = t.resolve("fr", "unknown-style");
        assert_eq!(s.language, "fr");
        assert_eq!(s.voice_id, t.voices["en"].voice_id);
        assert_eq!(s.stability, t.voices["en"].stability);
    }

    #[test]
    fn empty_table_still_resolves() {
        let t = VoiceTable {
            voices: BTreeMap::new(),
            styles: BTreeMap::new(),
        };
        let s = t.resolve("en", "calm");
        assert!(s.voice_id.is_empty());
        assert_eq!(s.model_id, "eleven_multilingual_v2");
    }
}
