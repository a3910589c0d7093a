// src/ingest/providers/trends_rss.rs
//! Broad-search trends from a trending-searches RSS feed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::topic::video_title;
use crate::ingest::types::CandidateSource;
use crate::model::{Candidate, SourceKind};

/// Feeds rarely give exact volumes; this is used when traffic is missing.
const DEFAULT_TRAFFIC: f64 = 1000.0;
const CONFIDENCE: f64 = 0.7;
const MAX_ITEMS: usize = 10;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    approx_traffic: Option<String>,
}

pub struct TrendsRssProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl TrendsRssProvider {
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    pub fn from_url(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    fn parse_items_from_str(s: &str) -> Result<Vec<Candidate>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing trends rss xml")?;

        let mut out = Vec::new();
        for it in rss.channel.item.into_iter().take(MAX_ITEMS) {
            let raw = crate::ingest::normalize_title(it.title.as_deref().unwrap_or_default());
            if raw.is_empty() {
                continue;
            }
            let (title, category) = video_title(&raw);
            let traffic = it
                .approx_traffic
                .as_deref()
                .and_then(parse_traffic)
                .unwrap_or(DEFAULT_TRAFFIC);
            out.push(
                Candidate::new(title, category, SourceKind::BroadSearch, traffic, CONFIDENCE)
                    .with_keywords(vec![raw]),
            );
        }

        histogram!("ingest_parse_ms", "source" => "trends_rss")
            .record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(out)
    }
}

#[async_trait]
impl CandidateSource for TrendsRssProvider {
    async fn fetch(&self) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s),
            Mode::Http { url, client } => {
                let body = super::get_text(client.get(url.as_str()), "trends rss").await?;
                Self::parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "trends_rss"
    }
}

/// "20,000+" → 20000, "50K+" → 50000, "2M+" → 2000000.
fn parse_traffic(s: &str) -> Option<f64> {
    let upper = s.trim().to_ascii_uppercase();
    let digits: String = upper.chars().filter(|c| c.is_ascii_digit()).collect();
    let n = digits.parse::<u64>().ok()? as f64;
    let scale = if upper.contains('M') {
        1_000_000.0
    } else if upper.contains('K') {
        1_000.0
    } else {
        1.0
    };
    Some(n * scale)
}

/// Namespaced traffic tag → plain tag, HTML-only entities → text.
fn scrub_for_xml(s: &str) -> String {
    s.replace("<ht:approx_traffic>", "<approx_traffic>")
        .replace("</ht:approx_traffic>", "</approx_traffic>")
        .replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
