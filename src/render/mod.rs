// src/render/mod.rs
//! Render stage: script + audio → vertical video. Subtitle layout and timing
//! live here; the encoder invocation is in [`ffmpeg`].

pub mod ffmpeg;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{Category, ScriptArtifact};

#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(
        &self,
        script: &ScriptArtifact,
        audio_path: &Path,
        language: &str,
        category: Category,
    ) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtitleStyle {
    pub font_size: u32,
    pub max_chars_per_line: usize,
}

pub fn subtitle_style(language: &str) -> SubtitleStyle {
    let (font_size, max_chars_per_line) = match language.trim().to_ascii_lowercase().as_str() {
        "de" => (44, 22),
        "ko" => (52, 20),
        "zh" => (50, 18),
        _ => (48, 25),
    };
    SubtitleStyle {
        font_size,
        max_chars_per_line,
    }
}

/// Background colour (hex RGB, no `#`) per category.
pub fn background_colour(category: Category) -> &'static str {
    match category {
        Category::Finance => "1a5f3f",
        Category::Tech => "1e3a8a",
        Category::Education => "7c2d12",
        Category::Lifestyle => "581c87",
        Category::Entertainment | Category::General => "374151",
    }
}

/// Greedy word wrap. Words longer than the limit get a line of their own.
/// Text without spaces (CJK) is wrapped by chars.
pub fn split_subtitle_lines(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if word.chars().count() > max_chars && !word.is_ascii() {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            lines.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }
        let extra = if current.is_empty() { 0 } else { 1 };
        if !current.is_empty() && current.chars().count() + extra + word.chars().count() > max_chars
        {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// `HH:MM:SS,mmm`
pub fn srt_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// SRT document with lines evenly spread over `duration_secs`.
pub fn build_srt(lines: &[String], duration_secs: f64) -> String {
    let mut out = String::new();
    if lines.is_empty() {
        return out;
    }
    let per_line = duration_secs.max(1.0) / lines.len() as f64;
    for (i, line) in lines.iter().enumerate() {
        let start = i as f64 * per_line;
        let end = (i + 1) as f64 * per_line;
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            srt_time(start),
            srt_time(end),
            line
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_words_by_language_width() {
        let en = subtitle_style("en");
        let lines = split_subtitle_lines(
            "Did you know that AI can pay your rent every month",
            en.max_chars_per_line,
        );
        assert!(lines.iter().all(|l| l.chars().count() <= 25), "{lines:?}");
        assert_eq!(lines.join(" "), "Did you know that AI can pay your rent every month");
        assert_eq!(subtitle_style("zh").max_chars_per_line, 18);
        assert_eq!(subtitle_style("fr"), en);
    }

    #[test]
    fn cjk_text_is_wrapped_by_chars() {
        let lines = split_subtitle_lines("你知道吗这很疯狂如果我告诉你人工智能可以帮你赚钱", 18);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].chars().count(), 18);
    }

    #[test]
    fn srt_timestamps() {
        assert_eq!(srt_time(0.0), "00:00:00,000");
        assert_eq!(srt_time(61.5), "00:01:01,500");
        assert_eq!(srt_time(3725.042), "01:02:05,042");
    }

    #[test]
    fn srt_spreads_lines_evenly() {
        let lines = vec!["one".to_string(), "two".to_string()];
        let srt = build_srt(&lines, 10.0);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:05,000\none\n\n2\n"));
        assert!(srt.contains("00:00:05,000 --> 00:00:10,000\ntwo"));
        assert!(build_srt(&[], 10.0).is_empty());
    }
}
