//! Upload stage. The shipped uploader publishes into an outbox directory:
//! the video plus a JSON metadata sidecar, per language.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;

use crate::model::{ScriptArtifact, UploadHandle};
use crate::storage::{next_sequence, topic_tag, write_atomic};

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        video_path: &Path,
        script: &ScriptArtifact,
        language: &str,
    ) -> Result<UploadHandle>;
}

pub struct OutboxUploader {
    dir: PathBuf,
}

#[derive(Serialize)]
struct Sidecar<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    tags: &'a [String],
    language: &'a str,
    category: &'a str,
    source_video: String,
}

impl OutboxUploader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Uploader for OutboxUploader {
    async fn upload(
        &self,
        video_path: &Path,
        script: &ScriptArtifact,
        language: &str,
    ) -> Result<UploadHandle> {
        let now = Utc::now();
        let id = format!(
            "{}_{}_{:06}_{}",
            language,
            now.format("%Y%m%d%H%M%S%3f"),
            next_sequence(),
            topic_tag(&script.topic)
        );
        let lang_dir = self.dir.join(language);
        tokio::fs::create_dir_all(&lang_dir)
            .await
            .with_context(|| format!("creating outbox {}", lang_dir.display()))?;

        let ext = video_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        let target = lang_dir.join(format!("{id}.{ext}"));
        tokio::fs::copy(video_path, &target)
            .await
            .with_context(|| format!("copying {} into outbox", video_path.display()))?;

        let sidecar = Sidecar {
            id: &id,
            title: &script.title,
            description: &script.description,
            tags: &script.tags,
            language,
            category: script.category.as_str(),
            source_video: video_path.display().to_string(),
        };
        let body = serde_json::to_vec_pretty(&sidecar).context("encoding sidecar")?;
        write_atomic(&lang_dir.join(format!("{id}.json")), &body)
            .await
            .context("writing sidecar")?;

        tracing::info!(target: "pipeline", id = %id, path = %target.display(), "published to outbox");
        Ok(UploadHandle {
            id,
            platform: "outbox".into(),
            language: language.to_string(),
            location: target.display().to_string(),
            uploaded_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[tokio::test]
    async fn copies_video_and_writes_sidecar() {
        let tmp = tempfile::tempdir().unwrap();
        let video = tmp.path().join("v.mp4");
        std::fs::write(&video, b"fake video").unwrap();

        let script = ScriptArtifact {
            topic: "AI money".into(),
            language: "de".into(),
            category: Category::Finance,
            title: "Geld mit KI".into(),
            hook: String::new(),
            main_points: vec![],
            content: String::new(),
            cta: String::new(),
            description: "desc".into(),
            tags: vec!["ki".into()],
            voice_style: "formal".into(),
            estimated_duration_secs: 10,
            affiliate_links: vec![],
            created_at: Utc::now(),
        };

        let up = OutboxUploader::new(tmp.path().join("outbox"));
        let h = up.upload(&video, &script, "de").await.unwrap();
        assert_eq!(h.platform, "outbox");
        assert_eq!(h.language, "de");
        assert!(h.id.starts_with("de_"));
        assert_eq!(std::fs::read(&h.location).unwrap(), b"fake video");

        let sidecar = tmp.path().join("outbox/de").join(format!("{}.json", h.id));
        let v: serde_json::Value =
            serde_json::from_slice(&std::fs::read(sidecar).unwrap()).unwrap();
        assert_eq!(v["title"], "Geld mit KI");
        assert_eq!(v["category"], "finance");
    }
}
