// src/ingest/topic.rs
//! Topic heuristics shared by the source adapters: keyword categorization,
//! video-format suggestion and title templating.

use std::fmt;

use crate::model::Category;

/// Checked in this order; first hit wins.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Finance,
        &["money", "investing", "crypto", "stocks", "business"],
    ),
    (
        Category::Tech,
        &["ai", "programming", "technology", "software", "automation"],
    ),
    (
        Category::Education,
        &["learning", "tips", "tutorial", "how to", "guide"],
    ),
    (
        Category::Lifestyle,
        &["productivity", "motivation", "success", "mindset"],
    ),
    (
        Category::Entertainment,
        &["funny", "viral", "trending", "meme", "story"],
    ),
];

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFormat {
    HowTo,
    Tips,
    List,
    Story,
    Controversial,
}

const FORMAT_KEYWORDS: &[(VideoFormat, &[&str])] = &[
    (
        VideoFormat::HowTo,
        &["how to", "tutorial", "guide", "step by step"],
    ),
    (VideoFormat::Tips, &["tips", "tricks", "hacks", "secrets"]),
    (
        VideoFormat::List,
        &["best", "top", "worst", "5 ways", "10 things"],
    ),
    (
        VideoFormat::Story,
        &["story", "experience", "journey", "case study"],
    ),
    (
        VideoFormat::Controversial,
        &["truth about", "reality of", "nobody tells you"],
    ),
];

impl VideoFormat {
    fn template(&self) -> &'static str {
        match self {
            Self::HowTo => "How to {topic} in 2025",
            Self::Tips => "5 {topic} Tips That Actually Work",
            Self::List => "Top 5 {topic} Methods",
            Self::Story => "My {topic} Journey: What I Learned",
            Self::Controversial => "The Dark Side of {topic}",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HowTo => "how_to",
            Self::Tips => "tips",
            Self::List => "list",
            Self::Story => "story",
            Self::Controversial => "controversial",
        })
    }
}

/// Keyword match. Single words must match a whole word; phrases match as
/// substrings of the lowercased text.
fn mentions(haystack: &str, words: &[&str], keyword: &str) -> bool {
    if keyword.contains(' ') {
        haystack.contains(keyword)
    } else {
        words.iter().any(|w| *w == keyword)
    }
}

fn lowered_words(text: &str) -> (String, Vec<String>) {
    let lower = text.to_lowercase();
    let words = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    (lower, words)
}

pub fn categorize(text: &str) -> Category {
    let (lower, words) = lowered_words(text);
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, kws)| kws.iter().any(|k| mentions(&lower, &words, k)))
        .map(|(c, _)| *c)
        .unwrap_or(Category::General)
}

pub fn suggest_format(text: &str, category: Category) -> VideoFormat {
    let (lower, words) = lowered_words(text);
    let words: Vec<&str> = words.iter().map(String::as_str).collect();
    if let Some((f, _)) = FORMAT_KEYWORDS
        .iter()
        .find(|(_, kws)| kws.iter().any(|k| mentions(&lower, &words, k)))
    {
        return *f;
    }
    match category {
        Category::Finance => VideoFormat::Tips,
        Category::Tech => VideoFormat::HowTo,
        Category::Education => VideoFormat::List,
        _ => VideoFormat::Story,
    }
}

/// Drop stop words and keep the first four remaining words.
pub fn clean_topic(text: &str) -> String {
    text.split_whitespace()
        .filter(|w| !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_for_video(text: &str, format: VideoFormat) -> String {
    let topic = clean_topic(text);
    if topic.is_empty() {
        return String::new();
    }
    format.template().replace("{topic}", &topic)
}

/// First five lowercased words longer than three chars.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().count() > 3)
        .take(5)
        .collect()
}

/// Categorize, pick a format and template the title in one go.
pub fn video_title(raw: &str) -> (String, Category) {
    let category = categorize(raw);
    let format = suggest_format(raw, category);
    (format_for_video(raw, format), category)
}
