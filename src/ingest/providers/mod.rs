// src/ingest/providers/mod.rs
pub mod forum_hot;
pub mod trends_rss;
pub mod video_trending;

use std::time::Duration;

use anyhow::{Context, Result};

use crate::config::SourcesConfig;

/// Shared HTTP client for the source adapters.
pub fn http_client(cfg: &SourcesConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(cfg.user_agent.as_str())
        .connect_timeout(Duration::from_secs(4))
        .timeout(Duration::from_secs(cfg.http_timeout_secs.max(1)))
        .build()
        .context("building source http client")
}

/// GET and return the body, failing on non-2xx.
pub(crate) async fn get_text(req: reqwest::RequestBuilder, what: &str) -> Result<String> {
    let resp = req
        .send()
        .await
        .with_context(|| format!("{what} http get"))?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("{what} returned {status}");
    }
    resp.text().await.with_context(|| format!("{what} http .text()"))
}
