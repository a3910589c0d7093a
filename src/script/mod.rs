// src/script/mod.rs
//! Script stage: prompt construction, LLM response parsing and the
//! [`ScriptGenerator`] contract.

pub mod ollama;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Category, ScriptArtifact, TrendHint};

/// Produces a structured script for one (topic, language) pair.
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(
        &self,
        topic: &str,
        language: &str,
        category: Category,
        hint: Option<&TrendHint>,
    ) -> Result<ScriptArtifact>;
}

/// Words per minute used for the duration estimate.
pub const SPEAKING_WPM: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LanguageProfile {
    pub voice_style: &'static str,
    pub max_words: u32,
    pub hooks: &'static [&'static str],
}

const EN: LanguageProfile = LanguageProfile {
    voice_style: "professional",
    max_words: 150,
    hooks: &[
        "Did you know that...",
        "Here's something crazy...",
        "What if I told you...",
    ],
};

/// Unknown languages use the English profile.
pub fn language_profile(language: &str) -> LanguageProfile {
    match language.trim().to_ascii_lowercase().as_str() {
        "de" => LanguageProfile {
            voice_style: "formal",
            max_words: 140,
            hooks: &[
                "Wussten Sie, dass...",
                "Hier ist etwas Verrücktes...",
                "Was wäre, wenn...",
            ],
        },
        "ko" => LanguageProfile {
            voice_style: "friendly",
            max_words: 120,
            hooks: &["알고 계셨나요?", "이건 정말 놀라운데요", "만약 제가 말씀드린다면"],
        },
        "zh" => LanguageProfile {
            voice_style: "energetic",
            max_words: 130,
            hooks: &["你知道吗", "这很疯狂", "如果我告诉你"],
        },
        _ => EN,
    }
}

fn category_instruction(category: Category) -> &'static str {
    match category {
        Category::Finance => "Focus on practical money-making strategies. Include specific numbers and examples. Mention both opportunities and risks.",
        Category::Tech => "Explain technical concepts in simple terms. Include step-by-step guidance and common mistakes to avoid.",
        Category::Education => "Make it educational but engaging. Use examples and analogies. Provide actionable takeaways.",
        Category::Lifestyle => "Keep it motivational and relatable. Include personal anecdotes and practical tips.",
        Category::Entertainment => "Make it engaging and fun. Use storytelling and humor where appropriate.",
        Category::General => "Keep it informative and engaging.",
    }
}

pub fn build_prompt(
    topic: &str,
    language: &str,
    category: Category,
    hint: Option<&TrendHint>,
) -> String {
    let profile = language_profile(language);
    let trend_line = hint
        .map(|h| {
            let mut s = format!(
                "This topic is currently trending on {} (signal {:.0}).",
                h.source, h.raw_metric
            );
            if !h.keywords.is_empty() {
                s.push_str(&format!(" Related keywords: {}.", h.keywords.join(", ")));
            }
            s
        })
        .unwrap_or_default();

    format!(
        r#"Create a compelling {max}-word video script about: "{topic}"
Language: {language}
Category: {category}
Voice Style: {style}
{trend_line}

REQUIREMENTS:
1. {instruction}
2. Start with a strong hook like one of these: {hooks}
3. Structure: Hook -> Main Content -> Call to Action
4. Suitable for a vertical short video (60 seconds max)
5. Include 3-5 specific, actionable points as a numbered list
6. Write in the {language} language, simple and conversational

Reply in exactly this format:
TITLE: [title]
HOOK: [first 5-10 seconds]
MAIN_CONTENT: [3-5 key points]
CTA: [call to action]
DESCRIPTION: [video description]
TAGS: [5-8 comma separated tags]
"#,
        max = profile.max_words,
        style = profile.voice_style,
        instruction = category_instruction(category),
        hooks = profile.hooks.join(", "),
    )
}

/// Fields of a parsed response. Missing sections keep their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedScript {
    pub title: String,
    pub hook: String,
    pub main_content: String,
    pub main_points: Vec<String>,
    pub cta: String,
    pub description: String,
    pub tags: Vec<String>,
    /// hook + main content + cta
    pub content: String,
}

static POINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\d+\.|-|•)\s*([^.!?]+[.!?])").expect("point regex"));

#[derive(PartialEq)]
enum Section {
    None,
    Main,
}

pub fn parse_structured(raw: &str) -> ParsedScript {
    let mut p = ParsedScript {
        title: "Generated Video".into(),
        hook: "Welcome to this video!".into(),
        main_content: String::new(),
        main_points: Vec::new(),
        cta: "Thanks for watching!".into(),
        description: "AI generated content".into(),
        tags: vec!["ai".into(), "automation".into(), "tips".into()],
        content: String::new(),
    };

    let mut section = Section::None;
    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(v) = line.strip_prefix("TITLE:") {
            p.title = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("HOOK:") {
            p.hook = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("MAIN_CONTENT:") {
            section = Section::Main;
            p.main_content = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("CTA:") {
            p.cta = v.trim().to_string();
            section = Section::None;
        } else if let Some(v) = line.strip_prefix("DESCRIPTION:") {
            p.description = v.trim().to_string();
        } else if let Some(v) = line.strip_prefix("TAGS:") {
            let tags: Vec<String> = v
                .split(',')
                .map(|t| t.trim().trim_start_matches('#').to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if !tags.is_empty() {
                p.tags = tags;
            }
        } else if section == Section::Main {
            if !p.main_content.is_empty() {
                p.main_content.push(' ');
            }
            p.main_content.push_str(line);
        }
    }

    p.main_points = POINT_RE
        .captures_iter(&p.main_content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let has_structure = raw.contains("HOOK:") || raw.contains("MAIN_CONTENT:");
    p.content = if has_structure {
        [p.hook.as_str(), p.main_content.as_str(), p.cta.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        raw.trim().to_string()
    };
    p
}

/// Seconds of narration at [`SPEAKING_WPM`], rounded, at least 1 for non-empty text.
pub fn estimate_duration(content: &str) -> u32 {
    let words = content.split_whitespace().count() as u32;
    if words == 0 {
        return 0;
    }
    ((words * 60 + SPEAKING_WPM / 2) / SPEAKING_WPM).max(1)
}

/// Assemble the artifact from a parsed response.
pub fn into_artifact(
    topic: &str,
    language: &str,
    category: Category,
    parsed: ParsedScript,
) -> ScriptArtifact {
    let profile = language_profile(language);
    ScriptArtifact {
        topic: topic.to_string(),
        language: language.to_string(),
        category,
        estimated_duration_secs: estimate_duration(&parsed.content),
        title: parsed.title,
        hook: parsed.hook,
        main_points: parsed.main_points,
        content: parsed.content,
        cta: parsed.cta,
        description: parsed.description,
        tags: parsed.tags,
        voice_style: profile.voice_style.to_string(),
        affiliate_links: Vec::new(),
        created_at: Utc::now(),
    }
}
