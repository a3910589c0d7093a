//! Output artifact layout.
//!
//! `<root>/scripts`, `<root>/audio`, `<root>/videos`. File names embed the
//! language code, a timestamp, a process-wide sequence number and a short
//! topic tag: `voice_en_20251019_101500_000042_3fa2c1e07b44.mp3`. The sequence
//! keeps same-title pairs running in the same second apart. There is no index;
//! past runs are discovered by listing these directories.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Next value of the process-wide artifact sequence; never repeats.
pub fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Scripts,
    Audio,
    Videos,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::Scripts, Self::Audio, Self::Videos];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Scripts => "scripts",
            Self::Audio => "audio",
            Self::Videos => "videos",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.dir_name().eq_ignore_ascii_case(s.trim()))
    }
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dir(&self, kind: ArtifactKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Create every artifact directory (idempotent).
    pub fn prepare(&self) -> io::Result<()> {
        for kind in ArtifactKind::ALL {
            std::fs::create_dir_all(self.dir(kind))?;
        }
        Ok(())
    }

    /// `<dir>/<prefix>_<lang>_<timestamp>_<seq>_<tag>.<ext>`; unique per call.
    pub fn artifact_path(
        &self,
        kind: ArtifactKind,
        prefix: &str,
        language: &str,
        tag: &str,
        ext: &str,
    ) -> PathBuf {
        let ts = Utc::now().format("%Y%m%d_%H%M%S");
        let seq = next_sequence();
        self.dir(kind)
            .join(format!("{prefix}_{language}_{ts}_{seq:06}_{tag}.{ext}"))
    }

    /// Pretty JSON into the given kind's directory; returns the written path.
    pub async fn write_json<T: Serialize>(
        &self,
        kind: ArtifactKind,
        prefix: &str,
        language: &str,
        tag: &str,
        value: &T,
    ) -> io::Result<PathBuf> {
        let path = self.artifact_path(kind, prefix, language, tag, "json");
        let body = serde_json::to_vec_pretty(value)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write_atomic(&path, &body).await?;
        Ok(path)
    }

    /// Files of one kind, sorted by name (names start with prefix + timestamp).
    pub fn list(&self, kind: ArtifactKind) -> io::Result<Vec<PathBuf>> {
        let dir = self.dir(kind);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut out: Vec<PathBuf> = std::fs::read_dir(dir)?
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        out.sort();
        Ok(out)
    }
}

/// Write via a sibling temp file + rename, so readers never see partial files.
/// Each call gets its own temp name; concurrent writers to one path never
/// share a temp file.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".{}.{}.tmp", std::process::id(), next_sequence()));
    let tmp = PathBuf::from(tmp);
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    tokio::fs::rename(&tmp, path).await
}

/// Short, stable tag for a piece of text (first 6 bytes of SHA-256, hex).
pub fn topic_tag(text: &str) -> String {
    use std::fmt::Write as _;
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
