// tests/e2e_smoke.rs
//
// End-to-end: two sources → ranking picks "AI money" over "funny cat" →
// script → enrich → real synthesis cascade (all providers down, so a silent
// placeholder) → render → outbox upload. The degraded audio does not fail
// the pair.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use content_pipeline::affiliate::CategoryAffiliates;
use content_pipeline::config::{AffiliateConfig, PipelineConfig, SynthesisConfig};
use content_pipeline::feedback::FeedbackScheduler;
use content_pipeline::history::History;
use content_pipeline::ingest::types::CandidateSource;
use content_pipeline::model::{AffiliateLink, Category, RunOutcome, SourceKind};
use content_pipeline::orchestrator::CycleOrchestrator;
use content_pipeline::pipeline::{StagePipeline, StageServices};
use content_pipeline::publish::OutboxUploader;
use content_pipeline::ranking::{rank, ScoringTables};
use content_pipeline::storage::OutputLayout;
use content_pipeline::voice::{SynthesisCascade, VoiceProvider, VoiceSettings};

use common::{candidate, CannedScripts, FakeRenderer, RecordingCollector, StaticSource};

struct Offline;

#[async_trait]
impl VoiceProvider for Offline {
    async fn synthesize_chunk(&self, _t: &str, _s: &VoiceSettings) -> Result<Vec<u8>> {
        Err(anyhow!("offline"))
    }
    fn name(&self) -> &'static str {
        "offline"
    }
    fn file_extension(&self) -> &'static str {
        "mp3"
    }
}

fn sources() -> Vec<Arc<dyn CandidateSource>> {
    vec![
        Arc::new(StaticSource {
            name: "video",
            items: vec![candidate(
                "AI money",
                Category::Finance,
                SourceKind::VideoPlatform,
                1200.0,
                0.8,
            )],
        }),
        Arc::new(StaticSource {
            name: "forum",
            items: vec![candidate(
                "funny cat",
                Category::Entertainment,
                SourceKind::Forum,
                50.0,
                0.6,
            )],
        }),
    ]
}

#[test]
fn ranking_prefers_ai_money() {
    let all = vec![
        candidate("AI money", Category::Finance, SourceKind::VideoPlatform, 1200.0, 0.8),
        candidate("funny cat", Category::Entertainment, SourceKind::Forum, 50.0, 0.6),
    ];
    let tables = ScoringTables::default();
    let r = rank(&all, 1, &tables);
    assert_eq!(r.ranked.len(), 1);
    assert_eq!(r.ranked[0].candidate.title, "AI money");
    assert_eq!(r.ranked[0].score, 1.0);
    assert!((tables.score(&all[1]) - 0.432).abs() < 1e-9);
}

#[tokio::test]
async fn ai_money_goes_all_the_way_to_the_outbox() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(tmp.path().join("output"));

    let mut links = BTreeMap::new();
    links.insert(
        "finance".to_string(),
        vec![AffiliateLink {
            label: "Broker".into(),
            url: "https://example.com/broker".into(),
        }],
    );
    let affiliates = AffiliateConfig {
        disclosure: "Affiliate links.".into(),
        links,
    };
    let synthesis = SynthesisConfig {
        placeholder_secs: 3,
        ..SynthesisConfig::default()
    };

    let services = StageServices {
        scripts: Arc::new(CannedScripts::default()),
        enricher: Arc::new(CategoryAffiliates::from_config(&affiliates)),
        narrator: Arc::new(SynthesisCascade::new(
            Arc::new(Offline),
            Arc::new(Offline),
            &synthesis,
            layout.clone(),
        )),
        renderer: Arc::new(FakeRenderer::new(layout.clone())),
        uploader: Arc::new(OutboxUploader::new(tmp.path().join("outbox"))),
    };
    let cfg = PipelineConfig {
        languages: vec!["en".into()],
        output_dir: tmp.path().join("output"),
        ..PipelineConfig::default()
    };
    let scheduler = Arc::new(FeedbackScheduler::new(Arc::new(RecordingCollector::default())));
    let history = Arc::new(History::with_capacity(4));
    let orchestrator = CycleOrchestrator::new(
        Arc::new(cfg),
        sources(),
        Arc::new(StagePipeline::new(services, layout, false)),
        scheduler.clone(),
        history.clone(),
    );

    let run = orchestrator.run_cycle(1).await.unwrap();

    assert_eq!(run.outcome(), RunOutcome::Complete);
    assert_eq!(run.candidates_considered, 2);
    assert_eq!(run.results.len(), 1);
    let result = &run.results[0];
    assert_eq!(result.topic, "AI money");
    assert_eq!(result.category, Category::Finance);

    let set = result.artifacts().expect("done");
    assert!(set.audio.degraded);
    assert_eq!(set.audio.attempts.len(), 3);
    assert_eq!(set.script.affiliate_links.len(), 1);
    assert!(set.script.description.contains("https://example.com/broker"));
    assert!(set.script.description.ends_with("Affiliate links."));

    let upload = set.upload.as_ref().expect("uploaded");
    assert_eq!(upload.platform, "outbox");
    assert!(std::path::Path::new(&upload.location).exists());
    assert!(tmp
        .path()
        .join("outbox/en")
        .join(format!("{}.json", upload.id))
        .exists());

    let summary = &history.snapshot_last_n(1)[0];
    assert_eq!(summary.degraded_audio, 1);
    assert_eq!(summary.topics, vec!["AI money".to_string()]);

    // JSON summary shape printed by the CLI.
    let v = serde_json::to_value(&run).unwrap();
    assert_eq!(v["results"][0]["status"], "done");
    assert_eq!(v["mode"], "trending");

    assert_eq!(scheduler.shutdown(), 1);
}
