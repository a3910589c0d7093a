// src/ingest/mod.rs
pub mod providers;
pub mod throttle;
pub mod topic;
pub mod types;

use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use metrics::{counter, histogram};

use crate::error::SourceUnavailable;
use crate::ingest::types::CandidateSource;
use crate::model::{Candidate, SourceFailure};

/// Normalize a source title: decode entities, strip tags, unify quotes,
/// collapse whitespace. Length capped at 300 chars.
pub fn normalize_title(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    out = re_tags.replace_all(&out, "").to_string();

    // 3) Curly quotes to ASCII
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: once_cell::sync::OnceCell<regex::Regex> = once_cell::sync::OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("ws regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    if out.chars().count() > 300 {
        out = out.chars().take(300).collect();
    }
    out
}

/// Everything the sources produced this round.
#[derive(Debug, Default)]
pub struct Harvest {
    /// Candidates in source order, then per-source discovery order.
    pub candidates: Vec<Candidate>,
    pub failures: Vec<SourceFailure>,
}

/// Query every source concurrently. A failing source is logged, counted and
/// recorded; it never fails the harvest.
pub async fn gather(sources: &[Arc<dyn CandidateSource>]) -> Harvest {
    crate::metrics::ensure_metrics_described();

    let t0 = Instant::now();
    let results = join_all(sources.iter().map(|s| {
        let s = Arc::clone(s);
        async move { (s.name(), s.fetch().await) }
    }))
    .await;

    let mut harvest = Harvest::default();
    for (name, res) in results {
        match res {
            Ok(mut v) => {
                tracing::info!(target: "ingest", source = name, count = v.len(), "source fetched");
                harvest.candidates.append(&mut v);
            }
            Err(e) => {
                let err = SourceUnavailable {
                    source_name: name.to_string(),
                    reason: format!("{e:#}"),
                };
                tracing::warn!(target: "ingest", error = %err, "source error");
                counter!("ingest_source_errors_total", "source" => name).increment(1);
                harvest.failures.push(err.into());
            }
        }
    }

    histogram!("ingest_gather_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
    counter!("ingest_candidates_total").increment(harvest.candidates.len() as u64);
    harvest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, SourceKind};
    use anyhow::anyhow;
    use async_trait::async_trait;

    #[test]
    fn normalize_title_cleans_markup() {
        let s = "  <b>AI&nbsp;&amp; money</b>\n  \u{201C}now\u{201D} ";
        assert_eq!(normalize_title(s), "AI & money \"now\"");
    }

    struct Ok2;
    #[async_trait]
    impl CandidateSource for Ok2 {
        async fn fetch(&self) -> anyhow::Result<Vec<Candidate>> {
            Ok(vec![
                Candidate::new("a", Category::Tech, SourceKind::Forum, 1.0, 0.5),
                Candidate::new("b", Category::Tech, SourceKind::Forum, 1.0, 0.5),
            ])
        }
        fn name(&self) -> &'static str {
            "ok2"
        }
    }

    struct Down;
    #[async_trait]
    impl CandidateSource for Down {
        async fn fetch(&self) -> anyhow::Result<Vec<Candidate>> {
            Err(anyhow!("timeout"))
        }
        fn name(&self) -> &'static str {
            "down"
        }
    }

    #[tokio::test]
    async fn failing_source_contributes_nothing() {
        let sources: Vec<Arc<dyn CandidateSource>> = vec![Arc::new(Down), Arc::new(Ok2)];
        let h = gather(&sources).await;
        assert_eq!(h.candidates.len(), 2);
        assert_eq!(h.candidates[0].title, "a");
        assert_eq!(h.failures.len(), 1);
        assert_eq!(h.failures[0].source, "down");
        assert!(h.failures[0].reason.contains("timeout"));
    }
}
