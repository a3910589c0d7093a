// src/voice/chunk.rs
//! Split narration text into provider-sized chunks.
//!
//! Sentences are packed greedily up to `limit` characters. A sentence longer
//! than the limit is split on whitespace; a single word longer than the limit
//! is hard-split on char boundaries. Limits are in chars, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?。！？]+[\s]+").expect("valid sentence regex"));

pub fn split_into_chunks(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if char_len(text) <= limit {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for sentence in sentences(text) {
        if char_len(&sentence) > limit {
            flush(&mut current, &mut chunks);
            chunks.extend(split_long_sentence(&sentence, limit));
            continue;
        }
        let extra = if current.is_empty() { 0 } else { 1 };
        if char_len(&current) + extra + char_len(&sentence) > limit {
            flush(&mut current, &mut chunks);
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&sentence);
    }
    flush(&mut current, &mut chunks);
    chunks
}

fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let s = text[start..m.end()].trim();
        if !s.is_empty() {
            out.push(s.to_string());
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

fn split_long_sentence(sentence: &str, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    for word in sentence.split_whitespace() {
        if char_len(word) > limit {
            flush(&mut current, &mut out);
            out.extend(hard_split(word, limit));
            continue;
        }
        let extra = if current.is_empty() { 0 } else { 1 };
        if char_len(&current) + extra + char_len(word) > limit {
            flush(&mut current, &mut out);
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    flush(&mut current, &mut out);
    out
}

fn hard_split(word: &str, limit: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}

fn flush(current: &mut String, out: &mut Vec<String>) {
    if !current.is_empty() {
        out.push(std::mem::take(current));
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_into_chunks("  Hello there.  ", 100), vec!["Hello there."]);
        assert!(split_into_chunks("   ", 100).is_empty());
    }

    #[test]
    fn packs_sentences_up_to_limit() {
        let text = "One two. Three four. Five six.";
        let chunks = split_into_chunks(text, 20);
        assert_eq!(chunks, vec!["One two. Three four.", "Five six."]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
    }

    #[test]
    fn long_sentence_splits_on_words_then_hard() {
        let text = "alpha beta gamma delta abcdefghijklmnop";
        let chunks = split_into_chunks(text, 10);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10), "{chunks:?}");
        assert_eq!(chunks.first().map(String::as_str), Some("alpha beta"));
        assert_eq!(chunks.last().map(String::as_str), Some("klmnop"));
    }

    #[test]
    fn multibyte_text_respects_char_limit() {
        let text = "가나다라마바사아자차카타파하";
        let chunks = split_into_chunks(text, 5);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 5));
        assert_eq!(chunks.concat(), text);
    }
}
