// src/ingest/providers/video_trending.rs
//! Video-platform "most popular" chart. Only very popular videos become
//! candidates; the metric is views in thousands.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SourcesConfig;
use crate::ingest::topic::{extract_keywords, video_title};
use crate::ingest::types::CandidateSource;
use crate::model::{Candidate, SourceKind};

const CONFIDENCE: f64 = 0.8;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    /// The API sends counts as strings.
    view_count: Option<String>,
}

struct ChartQuery {
    url: String,
    api_key: String,
    region: String,
    category_id: String,
    max_results: u32,
}

enum Mode {
    Fixture(String),
    Http {
        query: ChartQuery,
        client: reqwest::Client,
    },
}

pub struct VideoTrendingProvider {
    mode: Mode,
    min_views: u64,
}

impl VideoTrendingProvider {
    pub fn from_fixture_str(s: &str, min_views: u64) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
            min_views,
        }
    }

    pub fn from_config(cfg: &SourcesConfig, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                query: ChartQuery {
                    url: cfg.video_api_url.clone(),
                    api_key: cfg.video_api_key.clone(),
                    region: cfg.video_region.clone(),
                    category_id: cfg.video_category_id.clone(),
                    max_results: cfg.video_max_results,
                },
                client,
            },
            min_views: cfg.video_min_views,
        }
    }

    fn parse(&self, body: &str) -> Result<Vec<Candidate>> {
        let chart: ChartResponse =
            serde_json::from_str(body).context("parsing video chart json")?;

        let mut out = Vec::new();
        for v in chart.items {
            let views = v
                .statistics
                .view_count
                .as_deref()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(0);
            if views <= self.min_views {
                continue;
            }
            let raw = crate::ingest::normalize_title(&v.snippet.title);
            if raw.is_empty() {
                continue;
            }
            let (title, category) = video_title(&raw);
            let metric = (views / 1000) as f64;
            out.push(
                Candidate::new(title, category, SourceKind::VideoPlatform, metric, CONFIDENCE)
                    .with_keywords(extract_keywords(&raw)),
            );
        }
        Ok(out)
    }
}

#[async_trait]
impl CandidateSource for VideoTrendingProvider {
    async fn fetch(&self) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse(s),
            Mode::Http { query, client } => {
                if query.api_key.is_empty() {
                    bail!("video api key not configured");
                }
                let max = query.max_results.to_string();
                let req = client.get(query.url.as_str()).query(&[
                    ("part", "snippet,statistics"),
                    ("chart", "mostPopular"),
                    ("regionCode", query.region.as_str()),
                    ("videoCategoryId", query.category_id.as_str()),
                    ("maxResults", max.as_str()),
                    ("key", query.api_key.as_str()),
                ]);
                let body = super::get_text(req, "video chart").await?;
                self.parse(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "video_trending"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
      "items": [
        {"snippet": {"title": "I tried investing $100 in stocks"}, "statistics": {"viewCount": "2500000"}},
        {"snippet": {"title": "Small vlog"}, "statistics": {"viewCount": "1200"}},
        {"snippet": {"title": "Exactly the threshold"}, "statistics": {"viewCount": "100000"}},
        {"snippet": {"title": "No stats"}}
      ]
    }"#;

    #[tokio::test]
    async fn keeps_only_popular_videos() {
        let p = VideoTrendingProvider::from_fixture_str(JSON, 100_000);
        let items = p.fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].raw_metric, 2500.0);
        assert_eq!(items[0].confidence, 0.8);
        assert_eq!(items[0].source, SourceKind::VideoPlatform);
        assert!(!items[0].keywords.is_empty());
    }

    #[tokio::test]
    async fn missing_key_fails_the_source() {
        let cfg = SourcesConfig {
            video_api_key: String::new(),
            ..SourcesConfig::default()
        };
        let p = VideoTrendingProvider::from_config(&cfg, reqwest::Client::new());
        let err = p.fetch().await.unwrap_err();
        assert!(err.to_string().contains("api key"));
    }
}
