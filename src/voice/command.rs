// src/voice/command.rs
//! Local/offline TTS (tier 2): text on stdin, WAV on stdout.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{VoiceProvider, VoiceSettings};
use crate::config::SecondaryVoiceConfig;

pub struct CommandProvider {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandProvider {
    pub fn new(cfg: &SecondaryVoiceConfig) -> Self {
        Self {
            program: cfg.program.trim().to_string(),
            args: cfg.args.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs.max(1)),
        }
    }

    /// Args with `{language}` substituted.
    pub fn render_args(&self, language: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.replace("{language}", language))
            .collect()
    }
}

#[async_trait]
impl VoiceProvider for CommandProvider {
    fn name(&self) -> &'static str {
        "local_tts"
    }

    fn file_extension(&self) -> &'static str {
        "wav"
    }

    fn is_configured(&self) -> bool {
        !self.program.is_empty()
    }

    async fn synthesize_chunk(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(self.render_args(&settings.language))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning `{}`", self.program))?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin
                    .write_all(text.as_bytes())
                    .await
                    .context("writing text to tts stdin")?;
                // Dropping stdin closes the pipe so the tool sees EOF.
            }
            anyhow::Ok(())
        };
        let wait = async move {
            child
                .wait_with_output()
                .await
                .context("waiting for tts process")
        };

        // Feeding stdin counts against the timeout too.
        let (_, output) = tokio::time::timeout(self.timeout, async { tokio::try_join!(feed, wait) })
            .await
            .with_context(|| format!("`{}` timed out after {:?}", self.program, self.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let snippet: String = stderr.chars().take(200).collect();
            bail!("`{}` exited with {}: {}", self.program, output.status, snippet.trim());
        }
        Ok(output.stdout)
    }
}
