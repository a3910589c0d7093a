// src/render/ffmpeg.rs
//! ffmpeg-backed renderer: solid category background, narration audio and
//! burned-in SRT subtitles.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use super::{background_colour, build_srt, split_subtitle_lines, subtitle_style, Renderer};
use crate::config::RenderConfig;
use crate::model::{Category, ScriptArtifact};
use crate::storage::{topic_tag, write_atomic, ArtifactKind, OutputLayout};
use crate::voice::silence::{wav_duration_secs, HEADER_LEN};

const ENCODE_TIMEOUT: Duration = Duration::from_secs(300);

pub struct FfmpegRenderer {
    cfg: RenderConfig,
    layout: OutputLayout,
}

/// Everything one encoder run needs.
#[derive(Debug, Clone)]
pub struct RenderJob<'a> {
    pub audio: &'a Path,
    pub subtitles: &'a Path,
    pub output: &'a Path,
    pub category: Category,
    pub language: &'a str,
    pub duration_secs: u32,
}

impl FfmpegRenderer {
    pub fn new(cfg: RenderConfig, layout: OutputLayout) -> Self {
        Self { cfg, layout }
    }

    /// Encoder argument list (without the program name).
    pub fn build_args(&self, job: &RenderJob<'_>) -> Vec<String> {
        let style = subtitle_style(job.language);
        let background = format!(
            "color=c=0x{}:s={}x{}:r={}",
            background_colour(job.category),
            self.cfg.width,
            self.cfg.height,
            self.cfg.fps
        );
        let vf = format!(
            "scale={w}:{h},subtitles='{srt}':force_style='FontSize={fs},PrimaryColour=&HFFFFFF,Alignment=2,MarginV=150'",
            w = self.cfg.width,
            h = self.cfg.height,
            srt = escape_filter_path(job.subtitles),
            fs = style.font_size,
        );

        vec![
            "-y".into(),
            "-f".into(),
            "lavfi".into(),
            "-i".into(),
            background,
            "-i".into(),
            job.audio.display().to_string(),
            "-vf".into(),
            vf,
            "-c:v".into(),
            "libx264".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:v".into(),
            "2M".into(),
            "-b:a".into(),
            "128k".into(),
            "-r".into(),
            self.cfg.fps.to_string(),
            "-t".into(),
            job.duration_secs.to_string(),
            "-shortest".into(),
            job.output.display().to_string(),
        ]
    }

    /// Measured audio length wins over the script's estimate.
    fn clip_duration(&self, script: &ScriptArtifact, measured_secs: Option<u32>) -> u32 {
        measured_secs
            .unwrap_or(script.estimated_duration_secs)
            .clamp(1, self.cfg.max_duration_secs.max(1))
    }
}

/// Length of a WAV narration from its header; `None` for other formats.
async fn wav_file_secs(path: &Path) -> Option<u32> {
    let mut file = tokio::fs::File::open(path).await.ok()?;
    let mut header = [0u8; HEADER_LEN];
    file.read_exact(&mut header).await.ok()?;
    wav_duration_secs(&header)
}

/// Quote a path for use inside an ffmpeg filter argument.
fn escape_filter_path(p: &Path) -> String {
    p.display()
        .to_string()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn render(
        &self,
        script: &ScriptArtifact,
        audio_path: &Path,
        language: &str,
        category: Category,
    ) -> Result<PathBuf> {
        let tag = topic_tag(&script.topic);
        let duration_secs = self.clip_duration(script, wav_file_secs(audio_path).await);

        let lines = split_subtitle_lines(&script.content, subtitle_style(language).max_chars_per_line);
        let srt_path =
            self.layout
                .artifact_path(ArtifactKind::Videos, "subtitles", language, &tag, "srt");
        write_atomic(&srt_path, build_srt(&lines, f64::from(duration_secs)).as_bytes())
            .await
            .context("writing subtitles")?;

        let output = self
            .layout
            .artifact_path(ArtifactKind::Videos, "video", language, &tag, "mp4");
        let args = self.build_args(&RenderJob {
            audio: audio_path,
            subtitles: &srt_path,
            output: &output,
            category,
            language,
            duration_secs,
        });

        let child = Command::new(&self.cfg.ffmpeg_bin)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning `{}`", self.cfg.ffmpeg_bin))?;
        let out = tokio::time::timeout(ENCODE_TIMEOUT, child.wait_with_output())
            .await
            .context("video encoding timed out")?
            .context("waiting for encoder")?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            let tail: String = stderr
                .lines()
                .rev()
                .take(3)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect::<Vec<_>>()
                .join(" | ");
            bail!("encoder exited with {}: {}", out.status, tail);
        }

        if let Err(e) = tokio::fs::remove_file(&srt_path).await {
            tracing::debug!(target: "pipeline", error = %e, "subtitle cleanup failed");
        }
        tracing::info!(target: "pipeline", language, path = %output.display(), "video rendered");
        Ok(output)
    }
}
