// src/ingest/providers/forum_hot.rs
//! Forum "hot" listings over a list of communities. Calls are throttled;
//! a failing community is skipped, the source fails only if all of them did.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use crate::config::SourcesConfig;
use crate::ingest::throttle::Throttle;
use crate::ingest::topic::{extract_keywords, video_title};
use crate::ingest::types::CandidateSource;
use crate::model::{Candidate, SourceKind};

const CONFIDENCE: f64 = 0.6;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}
#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}
#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}
#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: String,
    #[serde(default)]
    score: i64,
}

enum Mode {
    /// (community, listing body) pairs.
    Fixture(Vec<(String, String)>),
    Http {
        base_url: String,
        communities: Vec<String>,
        limit: u32,
        client: reqwest::Client,
    },
}

pub struct ForumHotProvider {
    mode: Mode,
    min_score: i64,
    throttle: Throttle,
}

impl ForumHotProvider {
    pub fn from_fixtures(pages: Vec<(String, String)>, min_score: i64, interval: Duration) -> Self {
        Self {
            mode: Mode::Fixture(pages),
            min_score,
            throttle: Throttle::new(interval),
        }
    }

    pub fn from_config(cfg: &SourcesConfig, client: reqwest::Client) -> Self {
        Self {
            mode: Mode::Http {
                base_url: cfg.forum_base_url.trim_end_matches('/').to_string(),
                communities: cfg.forum_communities.clone(),
                limit: cfg.forum_limit,
                client,
            },
            min_score: cfg.forum_min_score,
            throttle: Throttle::new(Duration::from_millis(cfg.forum_min_interval_ms)),
        }
    }

    fn communities(&self) -> Vec<String> {
        match &self.mode {
            Mode::Fixture(pages) => pages.iter().map(|(c, _)| c.clone()).collect(),
            Mode::Http { communities, .. } => communities.clone(),
        }
    }

    async fn fetch_listing(&self, index: usize, community: &str) -> Result<String> {
        match &self.mode {
            Mode::Fixture(pages) => pages
                .get(index)
                .map(|(_, body)| body.clone())
                .ok_or_else(|| anyhow!("no fixture for {community}")),
            Mode::Http {
                base_url,
                limit,
                client,
                ..
            } => {
                let url = format!("{base_url}/r/{community}/hot.json");
                let req = client.get(url).query(&[("limit", limit.to_string())]);
                super::get_text(req, "forum listing").await
            }
        }
    }

    fn parse(&self, body: &str) -> Result<Vec<Candidate>> {
        let listing: Listing = serde_json::from_str(body).context("parsing forum listing json")?;
        let mut out = Vec::new();
        for child in listing.data.children {
            let post = child.data;
            if post.score <= self.min_score {
                continue;
            }
            let raw = crate::ingest::normalize_title(&post.title);
            if raw.is_empty() {
                continue;
            }
            let (title, category) = video_title(&raw);
            out.push(
                Candidate::new(title, category, SourceKind::Forum, post.score as f64, CONFIDENCE)
                    .with_keywords(extract_keywords(&raw)),
            );
        }
        Ok(out)
    }
}

#[async_trait]
impl CandidateSource for ForumHotProvider {
    async fn fetch(&self) -> Result<Vec<Candidate>> {
        let communities = self.communities();
        if communities.is_empty() {
            return Ok(Vec::new());
        }

        let mut out = Vec::new();
        let mut failed = 0usize;
        let mut last_err: Option<anyhow::Error> = None;

        for (i, community) in communities.iter().enumerate() {
            self.throttle.wait().await;
            let res = match self.fetch_listing(i, community).await {
                Ok(body) => self.parse(&body),
                Err(e) => Err(e),
            };
            match res {
                Ok(mut v) => out.append(&mut v),
                Err(e) => {
                    tracing::warn!(target: "ingest", community = %community, error = ?e, "community skipped");
                    failed += 1;
                    last_err = Some(e);
                }
            }
        }

        if failed == communities.len() {
            let e = last_err.unwrap_or_else(|| anyhow!("no community answered"));
            return Err(e.context(format!("all {failed} forum communities failed")));
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "forum_hot"
    }
}
