//! Durable worklist: a pending list plus append-only blocked and completed logs
//!
//! All three files are plain text with one album reference (URL or ID) per line.
//! [`WorklistStore`] is the only code that touches them.
//!
//! # Writer discipline
//!
//! The pending file is rewritten by [`WorklistStore::claim_and_remove`] and appended
//! to by [`WorklistStore::requeue`]. Both are called by the album orchestrator only,
//! one album at a time, never while an album's worker pools are running. No lock is
//! taken; introducing concurrent album processing requires serializing these calls.

use crate::config::WorklistConfig;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Single owner of the pending/blocked/completed files
#[derive(Clone, Debug)]
pub struct WorklistStore {
    pending: PathBuf,
    blocked: PathBuf,
    completed: PathBuf,
}

impl WorklistStore {
    /// Open the worklist, creating any missing file empty
    pub async fn open(config: &WorklistConfig) -> Result<Self> {
        let store = Self {
            pending: config.pending_file.clone(),
            blocked: config.blocked_file.clone(),
            completed: config.completed_file.clone(),
        };
        for path in [&store.pending, &store.blocked, &store.completed] {
            ensure_file(path).await?;
        }
        Ok(store)
    }

    /// Path of the pending list
    pub fn pending_path(&self) -> &Path {
        &self.pending
    }

    /// Pending entries in file order, trimmed, blank lines skipped
    pub async fn load_pending(&self) -> Result<Vec<String>> {
        read_entries(&self.pending).await
    }

    /// Entries recorded as blocked
    pub async fn load_blocked(&self) -> Result<Vec<String>> {
        read_entries(&self.blocked).await
    }

    /// Entries recorded as completed
    pub async fn load_completed(&self) -> Result<Vec<String>> {
        read_entries(&self.completed).await
    }

    /// Whether `entry` is already in the completed log
    pub async fn is_completed(&self, entry: &str) -> Result<bool> {
        let entry = entry.trim();
        Ok(self.load_completed().await?.iter().any(|e| e == entry))
    }

    /// Remove `entry` from the pending list
    ///
    /// Every line whose trimmed content equals the trimmed entry is dropped; other
    /// lines are written back untouched. The new list is written to a sibling temp
    /// file and renamed over the original, so a crash leaves either the old or the
    /// new list, never a truncated one. Returns whether any line was removed.
    pub async fn claim_and_remove(&self, entry: &str) -> Result<bool> {
        let entry = entry.trim();
        let content = read_to_string(&self.pending).await?;

        let mut removed = false;
        let kept: Vec<&str> = content
            .lines()
            .filter(|line| {
                let matches = !entry.is_empty() && line.trim() == entry;
                removed |= matches;
                !matches
            })
            .collect();

        if !removed {
            tracing::debug!(entry = %entry, "Entry not present in pending list");
            return Ok(false);
        }

        let mut rewritten = kept.join("\n");
        if !rewritten.is_empty() {
            rewritten.push('\n');
        }

        let tmp = temp_path(&self.pending);
        tokio::fs::write(&tmp, rewritten).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write '{}': {}", tmp.display(), e),
            ))
        })?;
        tokio::fs::rename(&tmp, &self.pending).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to replace '{}' with '{}': {}",
                    self.pending.display(),
                    tmp.display(),
                    e
                ),
            ))
        })?;

        tracing::debug!(entry = %entry, "Claimed entry from pending list");
        Ok(true)
    }

    /// Put `entry` back at the end of the pending list
    pub async fn requeue(&self, entry: &str) -> Result<()> {
        append_line(&self.pending, entry).await
    }

    /// Record `entry` in the blocked log
    pub async fn append_blocked(&self, entry: &str) -> Result<()> {
        append_line(&self.blocked, entry).await
    }

    /// Record `entry` in the completed log
    pub async fn append_completed(&self, entry: &str) -> Result<()> {
        append_line(&self.completed, entry).await
    }
}

async fn ensure_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create worklist file '{}': {}", path.display(), e),
            ))
        })?;
    Ok(())
}

async fn read_to_string(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read worklist file '{}': {}", path.display(), e),
        ))
    })
}

async fn read_entries(path: &Path) -> Result<Vec<String>> {
    Ok(read_to_string(path)
        .await?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Append one line, adding the missing newline of a hand-edited file first
async fn append_line(path: &Path, entry: &str) -> Result<()> {
    let entry = entry.trim();
    let needs_separator = match tokio::fs::read(path).await {
        Ok(bytes) => bytes.last().is_some_and(|b| *b != b'\n'),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };

    let mut line = String::with_capacity(entry.len() + 2);
    if needs_separator {
        line.push('\n');
    }
    line.push_str(entry);
    line.push('\n');

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
