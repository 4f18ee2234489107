//! Single URL and pending-list runs.

use std::collections::HashMap;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::types::{AlbumId, AlbumOutcome, AlbumRef, Event, ListSummary};

use super::AlbumDownloader;

impl AlbumDownloader {
    /// Process one user-supplied album URL or bare ID
    ///
    /// Fails with [`Error::UnresolvableId`](crate::Error::UnresolvableId) before any
    /// fetch if no album ID can be read from `input`.
    pub async fn process_url(&self, input: &str) -> Result<AlbumOutcome> {
        let album = AlbumRef::parse(input, &self.base_url)?;
        self.process_album(&album).await
    }

    /// Work through a snapshot of the pending list, one album at a time
    ///
    /// `cancel` is checked before each entry; once cancelled, the run stops without
    /// claiming anything else and the remaining entries stay pending. Album failures
    /// are counted and the run moves on. Only failing to read the pending list at
    /// the start is returned as an error.
    pub async fn process_pending(&self, cancel: &CancellationToken) -> Result<ListSummary> {
        let entries = self.worklist.load_pending().await?;
        tracing::info!(
            entries = entries.len(),
            file = %self.worklist.pending_path().display(),
            "Processing pending list"
        );

        let mut summary = ListSummary::default();
        // Album ID -> whether its outcome went to the blocked log
        let mut handled: HashMap<AlbumId, bool> = HashMap::new();

        for entry in entries {
            if cancel.is_cancelled() {
                tracing::info!("Run cancelled, remaining entries stay pending");
                break;
            }

            let album = match AlbumRef::parse(&entry, &self.base_url) {
                Ok(album) => album,
                Err(e) => {
                    tracing::warn!(entry = %entry, error = %e, "Skipping unresolvable entry");
                    summary.skipped += 1;
                    continue;
                }
            };

            if let Some(&blocked) = handled.get(&album.id) {
                self.record_duplicate(&album, blocked).await;
                summary.duplicates += 1;
                continue;
            }

            match self.process_album(&album).await {
                Ok(outcome) => {
                    handled.insert(album.id, outcome.is_blocked_log());
                    match outcome {
                        AlbumOutcome::Completed(_) => summary.completed += 1,
                        AlbumOutcome::Blocked => summary.blocked += 1,
                        AlbumOutcome::Empty => summary.empty += 1,
                    }
                }
                // Already logged and requeued by the album stage
                Err(_) => summary.failed += 1,
            }
        }

        tracing::info!(
            completed = summary.completed,
            blocked = summary.blocked,
            empty = summary.empty,
            failed = summary.failed,
            skipped = summary.skipped,
            duplicates = summary.duplicates,
            "Pending list finished"
        );
        self.emit_event(Event::ListFinished { summary });
        Ok(summary)
    }

    /// Claim a repeat of an album handled earlier in this run
    ///
    /// The entry is recorded in the same log as the first occurrence, without any
    /// fetch. Text identical to an earlier entry was already claimed with it, so
    /// nothing more is written in that case.
    async fn record_duplicate(&self, album: &AlbumRef, blocked: bool) {
        tracing::info!(album_id = %album.id, entry = %album.raw, "Duplicate album in list");

        if let Err(e) = self.claim_duplicate(album, blocked).await {
            tracing::warn!(album_id = %album.id, error = %e, "Failed to record duplicate entry");
        }
    }

    async fn claim_duplicate(&self, album: &AlbumRef, blocked: bool) -> Result<()> {
        if !self.worklist.claim_and_remove(&album.raw).await? {
            return Ok(());
        }
        if blocked {
            self.worklist.append_blocked(&album.raw).await
        } else {
            self.worklist.append_completed(&album.raw).await
        }
    }
}
