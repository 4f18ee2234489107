//! Single album state machine: claim, check, extract, resolve, download, record.

use crate::error::{Error, Result};
use crate::extractor::{AlbumPage, parse_album_page};
use crate::types::{AlbumOutcome, AlbumRef, Event};
use crate::utils::album_dir;

use super::AlbumDownloader;

impl AlbumDownloader {
    /// Download one album and record its outcome in the worklist
    ///
    /// The entry is claimed from the pending list before anything is fetched. A
    /// missing album is recorded as blocked without creating a folder, an album with
    /// no image pages is recorded as blocked too, and anything that got as far as
    /// the download stage is recorded as completed, even with per-file failures.
    ///
    /// When the album page cannot be fetched, the folder or a picture file cannot be
    /// written, or the outcome cannot be recorded, the claimed entry is put back at the end of the
    /// pending list and the error is returned. Nothing is written to the logs in
    /// that case.
    pub async fn process_album(&self, album: &AlbumRef) -> Result<AlbumOutcome> {
        tracing::info!(album_id = %album.id, url = %album.url, "Processing album");
        self.emit_event(Event::AlbumStarted {
            id: album.id,
            url: album.url.clone(),
        });

        let claimed = match self.worklist.claim_and_remove(&album.raw).await {
            Ok(claimed) => claimed,
            Err(e) => return Err(self.abort_album(album, false, e).await),
        };

        match self.worklist.is_completed(&album.raw).await {
            Ok(true) => {
                tracing::info!(album_id = %album.id, "Album already completed, checking for missing files")
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(album_id = %album.id, error = %e, "Could not read completed log")
            }
        }

        let result = match self.run_album(album).await {
            Ok(outcome) => self.record_outcome(album, &outcome).await.map(|()| outcome),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(e) => Err(self.abort_album(album, claimed, e).await),
        }
    }

    async fn run_album(&self, album: &AlbumRef) -> Result<AlbumOutcome> {
        let html = self.fetchers.session.fetch_html(&album.url).await?;

        let (metadata, image_pages) = match parse_album_page(&html, album.id, &self.base_url) {
            Ok(AlbumPage::Album {
                metadata,
                image_pages,
            }) => (metadata, image_pages),
            Ok(AlbumPage::Blocked) => return Ok(AlbumOutcome::Blocked),
            Err(Error::EmptyAlbum { .. }) => return Ok(AlbumOutcome::Empty),
            Err(e) => return Err(e),
        };

        tracing::info!(
            album_id = %album.id,
            name = %metadata.name,
            uploader = %metadata.uploader,
            declared_pictures = ?metadata.declared_pictures,
            image_pages = image_pages.len(),
            "Album details"
        );
        self.emit_event(Event::AlbumDetails {
            id: album.id,
            metadata: metadata.clone(),
            image_pages: image_pages.len(),
        });

        let links = self.resolve_links(&image_pages).await;
        self.emit_event(Event::LinksResolved {
            id: album.id,
            resolved: links.len(),
            total: image_pages.len(),
        });

        let target = album_dir(&self.config.output_dir, &metadata.name);
        let summary = self.download_all(album.id, &links, &target).await?;
        Ok(AlbumOutcome::Completed(summary))
    }

    /// Append the entry to the log matching `outcome` and announce it
    async fn record_outcome(&self, album: &AlbumRef, outcome: &AlbumOutcome) -> Result<()> {
        match outcome {
            AlbumOutcome::Completed(summary) => {
                self.worklist.append_completed(&album.raw).await?;
                tracing::info!(
                    album_id = %album.id,
                    downloaded = summary.downloaded,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "Album completed"
                );
                self.emit_event(Event::AlbumCompleted {
                    id: album.id,
                    summary: *summary,
                });
            }
            AlbumOutcome::Blocked => {
                self.worklist.append_blocked(&album.raw).await?;
                tracing::warn!(album_id = %album.id, "Album blocked or missing");
                self.emit_event(Event::AlbumBlocked { id: album.id });
            }
            AlbumOutcome::Empty => {
                self.worklist.append_blocked(&album.raw).await?;
                tracing::warn!(album_id = %album.id, "Album has no pictures");
                self.emit_event(Event::AlbumEmpty { id: album.id });
            }
        }
        Ok(())
    }

    /// Undo the claim and report the failure, handing the error back
    async fn abort_album(&self, album: &AlbumRef, claimed: bool, error: Error) -> Error {
        tracing::error!(album_id = %album.id, error = %error, "Album failed");

        if claimed && let Err(e) = self.worklist.requeue(&album.raw).await {
            tracing::error!(
                album_id = %album.id,
                entry = %album.raw,
                error = %e,
                "Failed to requeue album, entry is no longer pending"
            );
        }

        self.emit_event(Event::AlbumFailed {
            id: album.id,
            error: error.to_string(),
        });
        error
    }
}
