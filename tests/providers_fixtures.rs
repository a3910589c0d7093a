// tests/providers_fixtures.rs
//
// Candidate source adapters against recorded payloads in tests/fixtures,
// plus gathering across sources with one broken adapter.

use std::sync::Arc;
use std::time::Duration;

use content_pipeline::ingest::gather;
use content_pipeline::ingest::providers::{
    forum_hot::ForumHotProvider, trends_rss::TrendsRssProvider,
    video_trending::VideoTrendingProvider,
};
use content_pipeline::ingest::types::CandidateSource;
use content_pipeline::model::{Category, SourceKind};

const TRENDS_XML: &str = include_str!("fixtures/trends_rss.xml");
const VIDEO_JSON: &str = include_str!("fixtures/video_trending.json");
const FORUM_JSON: &str = include_str!("fixtures/forum_hot.json");

#[tokio::test]
async fn trends_fixture_yields_broad_search_candidates() {
    let p = TrendsRssProvider::from_fixture_str(TRENDS_XML);
    let items = p.fetch().await.expect("trends parse ok");

    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|c| c.source == SourceKind::BroadSearch));
    assert!(items.iter().all(|c| c.confidence == 0.7));

    assert_eq!(items[0].category, Category::Finance);
    assert_eq!(items[0].raw_metric, 50_000.0);
    assert!(items[0].title.contains("crypto & stocks"), "{}", items[0].title);

    assert_eq!(items[1].category, Category::Tech);
    assert_eq!(items[1].raw_metric, 2_000.0);
    assert_eq!(items[2].raw_metric, 500.0);

    // No traffic element: default volume.
    assert_eq!(items[3].category, Category::Lifestyle);
    assert_eq!(items[3].raw_metric, 1_000.0);
}

#[tokio::test]
async fn video_fixture_keeps_only_popular_videos() {
    let p = VideoTrendingProvider::from_fixture_str(VIDEO_JSON, 100_000);
    let items = p.fetch().await.expect("video parse ok");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].category, Category::Finance);
    assert_eq!(items[0].raw_metric, 3_400.0);
    assert_eq!(items[1].category, Category::Entertainment);
    assert_eq!(items[1].raw_metric, 150.0);
    assert!(items
        .iter()
        .all(|c| c.source == SourceKind::VideoPlatform && c.confidence == 0.8));
}

#[tokio::test(start_paused = true)]
async fn forum_fixture_filters_by_score() {
    let pages = vec![
        ("personalfinance".to_string(), FORUM_JSON.to_string()),
        ("down".to_string(), "Too Many Requests".to_string()),
    ];
    let p = ForumHotProvider::from_fixtures(pages, 100, Duration::from_millis(500));
    let items = p.fetch().await.expect("one community is enough");

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].raw_metric, 4_210.0);
    assert_eq!(items[1].raw_metric, 101.0);
    assert_eq!(items[1].category, Category::Education);
    assert!(items.iter().all(|c| c.source == SourceKind::Forum));
}

#[tokio::test(start_paused = true)]
async fn gather_merges_sources_and_reports_the_broken_one() {
    let sources: Vec<Arc<dyn CandidateSource>> = vec![
        Arc::new(TrendsRssProvider::from_fixture_str(TRENDS_XML)),
        Arc::new(TrendsRssProvider::from_fixture_str("<not-rss/>")),
        Arc::new(VideoTrendingProvider::from_fixture_str(VIDEO_JSON, 100_000)),
    ];
    let harvest = gather(&sources).await;

    assert_eq!(harvest.candidates.len(), 6);
    assert_eq!(harvest.failures.len(), 1);
    assert_eq!(harvest.failures[0].source, "trends_rss");
}
