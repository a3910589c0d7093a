//! # Data model
//! Tagged records passed between components: candidates, scored candidates,
//! script artifacts, synthesis trails, per-pair results and the run aggregate.
//!
//! Everything here is plain data (serde-friendly, no I/O) so stage boundaries
//! stay statically checkable and the run summary can be printed as JSON.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content category. Closed set; unknown labels collapse to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Category {
    Finance,
    Tech,
    Education,
    Lifestyle,
    Entertainment,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Finance,
        Category::Tech,
        Category::Education,
        Category::Lifestyle,
        Category::Entertainment,
        Category::General,
    ];

    /// Case-insensitive label lookup; anything unmapped is `General`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "finance" => Self::Finance,
            "tech" | "technology" => Self::Tech,
            "education" => Self::Education,
            "lifestyle" => Self::Lifestyle,
            "entertainment" => Self::Entertainment,
            _ => Self::General,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finance => "finance",
            Self::Tech => "tech",
            Self::Education => "education",
            Self::Lifestyle => "lifestyle",
            Self::Entertainment => "entertainment",
            Self::General => "general",
        }
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self::from_label(&s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a candidate was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    BroadSearch,
    VideoPlatform,
    Forum,
}

impl SourceKind {
    /// Tie-break priority: video_platform > broad_search > forum.
    pub fn priority(&self) -> u8 {
        match self {
            Self::VideoPlatform => 3,
            Self::BroadSearch => 2,
            Self::Forum => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BroadSearch => "broad_search",
            Self::VideoPlatform => "video_platform",
            Self::Forum => "forum",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw topic suggestion from one source, pre-ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Blank means "missing"; such candidates are dropped by the ranker.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: Category,
    pub source: SourceKind,
    #[serde(default)]
    pub raw_metric: f64,
    #[serde(default)]
    pub confidence: f64,
    /// Related keywords carried through to the script stage as a trend hint.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

impl Candidate {
    /// Builds a candidate with confidence clamped into `[0, 1]` (NaN becomes 0).
    pub fn new(
        title: impl Into<String>,
        category: Category,
        source: SourceKind,
        raw_metric: f64,
        confidence: f64,
    ) -> Self {
        Self {
            title: title.into(),
            category,
            source,
            raw_metric: if raw_metric.is_finite() { raw_metric } else { 0.0 },
            confidence: clamp_unit(confidence),
            keywords: Vec::new(),
        }
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

/// A candidate plus its derived score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    pub score: f64,
}

/// Trend metadata forwarded to the script generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendHint {
    pub source: SourceKind,
    pub raw_metric: f64,
    pub keywords: Vec<String>,
}

impl From<&Candidate> for TrendHint {
    fn from(c: &Candidate) -> Self {
        Self {
            source: c.source,
            raw_metric: c.raw_metric,
            keywords: c.keywords.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub label: String,
    pub url: String,
}

/// Structured script produced by the script stage (and possibly enriched).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptArtifact {
    pub topic: String,
    pub language: String,
    pub category: Category,
    pub title: String,
    pub hook: String,
    #[serde(default)]
    pub main_points: Vec<String>,
    /// Full narration text (hook + main content + call to action).
    pub content: String,
    pub cta: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub voice_style: String,
    pub estimated_duration_secs: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affiliate_links: Vec<AffiliateLink>,
    pub created_at: DateTime<Utc>,
}

/// Opaque reference to a published video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadHandle {
    pub id: String,
    pub platform: String,
    pub language: String,
    /// URL or path where the published artifact lives.
    pub location: String,
    pub uploaded_at: DateTime<Utc>,
}

/// One unit of the per-(topic, language) pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Script,
    Enrich,
    Voice,
    Render,
    Upload,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Enrich => "enrich",
            Self::Voice => "voice",
            Self::Render => "render",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a synthesis tier failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Provider missing credentials or binary.
    Unconfigured,
    /// Provider call returned an error.
    Provider,
    /// Provider answered with zero bytes, or there was nothing to send.
    Empty,
    /// Artifact could not be written.
    Io,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success { path: PathBuf },
    Failure { kind: FailureKind, message: String },
}

/// One entry of the cascade's attempt trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisAttempt {
    /// 1 = primary, 2 = secondary, 3 = silent placeholder.
    pub tier: u8,
    pub provider: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl SynthesisAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success { .. })
    }
}

/// Terminal artifact of the synthesis cascade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedAudio {
    pub path: PathBuf,
    /// Set when every real provider failed and the silent placeholder was used.
    pub degraded: bool,
    /// Placeholder length in seconds; only present for degraded artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_secs: Option<u32>,
    pub attempts: Vec<SynthesisAttempt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageArtifactSet {
    pub script: ScriptArtifact,
    pub audio: SynthesizedAudio,
    pub video_path: PathBuf,
    /// `None` only when the run skipped publishing (test mode).
    pub upload: Option<UploadHandle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub stage: Stage,
    pub message: String,
}

/// Exactly one of artifacts or error, enforced by the enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopicOutcome {
    Done(StageArtifactSet),
    Failed(ErrorRecord),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicResult {
    pub topic: String,
    pub language: String,
    pub category: Category,
    #[serde(flatten)]
    pub outcome: TopicOutcome,
}

impl TopicResult {
    pub fn is_done(&self) -> bool {
        matches!(self.outcome, TopicOutcome::Done(_))
    }

    pub fn artifacts(&self) -> Option<&StageArtifactSet> {
        match &self.outcome {
            TopicOutcome::Done(a) => Some(a),
            TopicOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorRecord> {
        match &self.outcome {
            TopicOutcome::Done(_) => None,
            TopicOutcome::Failed(e) => Some(e),
        }
    }
}

/// Payload entry of a deferred feedback task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub upload: UploadHandle,
    pub script: ScriptArtifact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Trending,
    Topic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

/// Aggregate classification of a run, used by the one-shot CLI surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// No (topic, language) pair was attempted.
    Empty,
    Complete,
    Partial,
    Failed,
}

/// One execution of the cycle orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub id: String,
    pub mode: RunMode,
    pub created_at: DateTime<Utc>,
    pub candidates_considered: usize,
    pub skipped_candidates: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_sources: Vec<SourceFailure>,
    pub results: Vec<TopicResult>,
}

impl PipelineRun {
    pub fn new(mode: RunMode) -> Self {
        let created_at = Utc::now();
        Self {
            id: format!("run_{}", created_at.format("%Y%m%d_%H%M%S_%3f")),
            mode,
            created_at,
            candidates_considered: 0,
            skipped_candidates: 0,
            failed_sources: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn done_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_done()).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.len() - self.done_count()
    }

    pub fn outcome(&self) -> RunOutcome {
        let done = self.done_count();
        match (self.results.len(), done) {
            (0, _) => RunOutcome::Empty,
            (n, d) if d == n => RunOutcome::Complete,
            (_, 0) => RunOutcome::Failed,
            _ => RunOutcome::Partial,
        }
    }

    /// Successful uploads paired with their scripts, in result order.
    pub fn feedback_items(&self) -> Vec<FeedbackItem> {
        self.results
            .iter()
            .filter_map(|r| r.artifacts())
            .filter_map(|a| {
                a.upload.as_ref().map(|u| FeedbackItem {
                    upload: u.clone(),
                    script: a.script.clone(),
                })
            })
            .collect()
    }

    /// Distinct topics in result order.
    pub fn topics(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.results {
            if !out.contains(&r.topic.as_str()) {
                out.push(r.topic.as_str());
            }
        }
        out
    }
}

fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_labels_fall_back_to_general() {
        assert_eq!(Category::from_label("Finance"), Category::Finance);
        assert_eq!(Category::from_label(" TECH "), Category::Tech);
        assert_eq!(Category::from_label("gardening"), Category::General);

        let c: Category = serde_json::from_str(r#""sports""#).unwrap();
        assert_eq!(c, Category::General);
        assert_eq!(serde_json::to_string(&Category::Lifestyle).unwrap(), r#""lifestyle""#);
    }

    #[test]
    fn candidate_confidence_is_clamped() {
        let hi = Candidate::new("x", Category::Tech, SourceKind::Forum, 1.0, 1.7);
        let lo = Candidate::new("x", Category::Tech, SourceKind::Forum, 1.0, -0.2);
        let nan = Candidate::new("x", Category::Tech, SourceKind::Forum, f64::NAN, f64::NAN);
        assert_eq!(hi.confidence, 1.0);
        assert_eq!(lo.confidence, 0.0);
        assert_eq!(nan.confidence, 0.0);
        assert_eq!(nan.raw_metric, 0.0);
    }

    #[test]
    fn candidate_without_title_deserializes_as_blank() {
        let c: Candidate =
            serde_json::from_str(r#"{"source":"forum","raw_metric":10,"confidence":0.5}"#).unwrap();
        assert!(!c.has_title());
        assert_eq!(c.category, Category::General);
    }

    fn failed(topic: &str, lang: &str) -> TopicResult {
        TopicResult {
            topic: topic.into(),
            language: lang.into(),
            category: Category::General,
            outcome: TopicOutcome::Failed(ErrorRecord {
                stage: Stage::Script,
                message: "boom".into(),
            }),
        }
    }

    #[test]
    fn run_outcome_classification() {
        let mut run = PipelineRun::new(RunMode::Topic);
        assert_eq!(run.outcome(), RunOutcome::Empty);

        run.results.push(failed("a", "en"));
        assert_eq!(run.outcome(), RunOutcome::Failed);
        assert_eq!(run.error_count(), 1);
        assert!(run.feedback_items().is_empty());
    }

    #[test]
    fn topic_result_serializes_with_status_tag() {
        let v = serde_json::to_value(failed("a", "de")).unwrap();
        assert_eq!(v["status"], "failed");
        assert_eq!(v["stage"], "script");
        assert_eq!(v["language"], "de");
    }
}
