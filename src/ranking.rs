//! # Ranking Engine
//! Pure, deterministic scoring of heterogeneous candidates into one ordered
//! list. No I/O, suitable for unit tests and offline replays.
//!
//! `score = confidence × category × source × volume`, clamped to `[0, 1]`.
//! Ordering: score descending, then source priority
//! (video_platform > broad_search > forum), then discovery order.

use std::cmp::Ordering;

use metrics::counter;
use serde::{Deserialize, Serialize};

use crate::model::{Candidate, Category, ScoredCandidate, SourceKind};

/// Category multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub finance: f64,
    pub tech: f64,
    pub education: f64,
    pub lifestyle: f64,
    pub entertainment: f64,
    pub general: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            finance: 1.3,
            tech: 1.2,
            education: 1.1,
            lifestyle: 0.9,
            entertainment: 0.8,
            general: 1.0,
        }
    }
}

/// Source multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceWeights {
    pub video_platform: f64,
    pub broad_search: f64,
    pub forum: f64,
}

impl Default for SourceWeights {
    fn default() -> Self {
        Self {
            video_platform: 1.2,
            broad_search: 1.1,
            forum: 0.9,
        }
    }
}

/// `raw_metric > above` earns `multiplier`; highest matching threshold wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeTier {
    pub above: f64,
    pub multiplier: f64,
}

/// Scoring tables; defaults reproduce the production weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTables {
    pub category: CategoryWeights,
    pub source: SourceWeights,
    pub volume: Vec<VolumeTier>,
}

impl Default for ScoringTables {
    fn default() -> Self {
        Self {
            category: CategoryWeights::default(),
            source: SourceWeights::default(),
            volume: vec![
                VolumeTier {
                    above: 1000.0,
                    multiplier: 1.2,
                },
                VolumeTier {
                    above: 500.0,
                    multiplier: 1.1,
                },
            ],
        }
    }
}

impl ScoringTables {
    pub fn category_multiplier(&self, c: Category) -> f64 {
        let w = &self.category;
        match c {
            Category::Finance => w.finance,
            Category::Tech => w.tech,
            Category::Education => w.education,
            Category::Lifestyle => w.lifestyle,
            Category::Entertainment => w.entertainment,
            Category::General => w.general,
        }
    }

    pub fn source_multiplier(&self, s: SourceKind) -> f64 {
        match s {
            SourceKind::VideoPlatform => self.source.video_platform,
            SourceKind::BroadSearch => self.source.broad_search,
            SourceKind::Forum => self.source.forum,
        }
    }

    /// Independent of the order tiers were configured in.
    pub fn volume_multiplier(&self, raw_metric: f64) -> f64 {
        self.volume
            .iter()
            .filter(|t| raw_metric > t.above)
            .max_by(|a, b| a.above.total_cmp(&b.above))
            .map(|t| t.multiplier)
            .unwrap_or(1.0)
    }

    /// Score of a single candidate, clamped to `[0, 1]`.
    pub fn score(&self, c: &Candidate) -> f64 {
        let raw = c.confidence.clamp(0.0, 1.0)
            * self.category_multiplier(c.category)
            * self.source_multiplier(c.source)
            * self.volume_multiplier(c.raw_metric);
        if raw.is_nan() {
            0.0
        } else {
            raw.clamp(0.0, 1.0)
        }
    }
}

/// Ranked output plus the diagnostic count of dropped (malformed) candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub ranked: Vec<ScoredCandidate>,
    pub skipped: usize,
}

/// Score, order and truncate. Candidates without a title are dropped and
/// counted in `skipped`; this never fails.
pub fn rank(candidates: &[Candidate], top_n: usize, tables: &ScoringTables) -> Ranking {
    let mut skipped = 0usize;
    let mut scored: Vec<ScoredCandidate> = Vec::with_capacity(candidates.len());

    for c in candidates {
        if !c.has_title() {
            skipped += 1;
            continue;
        }
        scored.push(ScoredCandidate {
            score: tables.score(c),
            candidate: c.clone(),
        });
    }

    // `sort_by` is stable, so equal keys keep discovery order.
    scored.sort_by(compare_ranked);
    scored.truncate(top_n);

    if skipped > 0 {
        tracing::debug!(target: "ranking", skipped, "dropped candidates without title");
        counter!("ranking_skipped_total").increment(skipped as u64);
    }

    Ranking {
        ranked: scored,
        skipped,
    }
}

fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| {
        b.candidate
            .source
            .priority()
            .cmp(&a.candidate.source.priority())
    })
}
