//! Download pool: writes direct links to files in the album folder.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::config::ExecutionMode;
use crate::error::{Error, Result};
use crate::fetcher::ByteFetcher;
use crate::types::{AlbumId, DirectLink, DownloadSummary, Event};

use super::AlbumDownloader;

/// Result of one download attempt that did not fail
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum FileOutcome {
    /// Fetched and written
    Downloaded(PathBuf),
    /// Already present, no fetch made
    Skipped(PathBuf),
}

impl AlbumDownloader {
    /// Download every link into `album_dir`
    ///
    /// The folder (and its parents) is created first; failing to create it aborts the
    /// album. Files already present are skipped without a fetch, which makes re-runs
    /// cheap. Fetch failures are logged, reported as [`Event::ImageFailed`], and
    /// counted in the summary.
    ///
    /// A file that cannot be written is a local problem that would hit every later
    /// picture too, so once the pool drains the first such [`Error::Io`] is returned
    /// and the album is not recorded as completed.
    pub async fn download_all(
        &self,
        id: AlbumId,
        links: &[DirectLink],
        album_dir: &Path,
    ) -> Result<DownloadSummary> {
        let mode = self.config.download_mode();
        match mode {
            ExecutionMode::Sequential => {
                tracing::info!(album_id = %id, files = links.len(), "Starting picture downloads")
            }
            ExecutionMode::Pooled(_) => tracing::info!(
                album_id = %id,
                files = links.len(),
                workers = mode.width(),
                "Starting picture downloads with worker pool"
            ),
        }

        let results = download_links_with(&self.fetchers.bytes, links, album_dir, mode).await?;

        let mut summary = DownloadSummary::default();
        let mut write_error = None;
        for (link, result) in results {
            match result {
                Ok(FileOutcome::Downloaded(path)) => {
                    summary.downloaded += 1;
                    self.emit_event(Event::ImageDownloaded { id, path });
                }
                Ok(FileOutcome::Skipped(path)) => {
                    summary.skipped += 1;
                    self.emit_event(Event::ImageSkipped { id, path });
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(album_id = %id, url = %link, error = %e, "Failed to download");
                    self.emit_event(Event::ImageFailed {
                        id,
                        url: link.to_string(),
                        error: e.to_string(),
                    });
                    if write_error.is_none() && matches!(e, Error::Io(_)) {
                        write_error = Some(e);
                    }
                }
            }
        }

        match write_error {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }
}

/// Fetch `links` into `album_dir` with the given scheduling
///
/// Returns one result per link, in completion order. Only the folder creation error
/// is returned as `Err`; everything else is per item, with fetch failures as
/// [`Error::DownloadFailed`] and local write failures as [`Error::Io`].
pub(crate) async fn download_links_with(
    fetcher: &Arc<dyn ByteFetcher>,
    links: &[DirectLink],
    album_dir: &Path,
    mode: ExecutionMode,
) -> Result<Vec<(DirectLink, Result<FileOutcome>)>> {
    tokio::fs::create_dir_all(album_dir).await.map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!(
                "Failed to create album directory '{}': {}",
                album_dir.display(),
                e
            ),
        ))
    })?;

    // Two links sharing a file name would race on the same target
    let mut seen = HashSet::with_capacity(links.len());
    let mut jobs = Vec::with_capacity(links.len());
    let mut results = Vec::with_capacity(links.len());
    for link in links {
        match link.file_name() {
            Some(name) if seen.insert(name.clone()) => jobs.push((link.clone(), name)),
            Some(name) => {
                tracing::debug!(url = %link, file = %name, "Duplicate file name, skipping");
                results.push((link.clone(), Ok(FileOutcome::Skipped(album_dir.join(name)))));
            }
            None => results.push((
                link.clone(),
                Err(Error::DownloadFailed {
                    url: link.to_string(),
                    reason: "no file name in URL".into(),
                }),
            )),
        }
    }

    match mode {
        ExecutionMode::Sequential => {
            for (link, name) in jobs {
                let result = download_one(fetcher.as_ref(), &link, album_dir, &name).await;
                results.push((link, result));
            }
        }
        ExecutionMode::Pooled(_) => {
            let pooled: Vec<_> = stream::iter(jobs)
                .map(|(link, name)| {
                    let fetcher = Arc::clone(fetcher);
                    async move {
                        let result = download_one(fetcher.as_ref(), &link, album_dir, &name).await;
                        (link, result)
                    }
                })
                .buffer_unordered(mode.width())
                .collect()
                .await;
            results.extend(pooled);
        }
    }

    Ok(results)
}

/// Download one link unless its file already exists
///
/// Bytes land in `<name>.part` first and are renamed into place, so an interrupted
/// write never passes for a finished file on the next run.
async fn download_one(
    fetcher: &dyn ByteFetcher,
    link: &DirectLink,
    album_dir: &Path,
    name: &str,
) -> Result<FileOutcome> {
    let target = album_dir.join(name);
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        return Ok(FileOutcome::Skipped(target));
    }

    let bytes = fetcher
        .fetch_bytes(link.as_str())
        .await
        .map_err(|e| Error::DownloadFailed {
            url: link.to_string(),
            reason: e.to_string(),
        })?;

    let partial = album_dir.join(format!("{name}.part"));
    if let Err(e) = write_then_rename(&partial, &target, &bytes).await {
        tokio::fs::remove_file(&partial).await.ok();
        return Err(Error::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write '{}': {}", target.display(), e),
        )));
    }

    tracing::debug!(file = %target.display(), bytes = bytes.len(), "Saved picture");
    Ok(FileOutcome::Downloaded(target))
}

async fn write_then_rename(partial: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::write(partial, bytes).await?;
    tokio::fs::rename(partial, target).await
}
