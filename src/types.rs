//! Core types for luscious-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Numeric identifier of an album, as embedded in its URL
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(pub u64);

impl AlbumId {
    /// Create a new AlbumId
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for AlbumId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<AlbumId> for u64 {
    fn from(id: AlbumId) -> Self {
        id.0
    }
}

impl std::fmt::Display for AlbumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AlbumId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// Numeric identifier of a user profile
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated album reference
///
/// Only references that resolved to an [`AlbumId`] enter the pipeline. `raw` keeps the
/// exact text the user or the worklist supplied so the worklist can match it later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlbumRef {
    /// Resolved album ID
    pub id: AlbumId,
    /// Album page URL to fetch
    pub url: String,
    /// Original input, trimmed
    pub raw: String,
}

/// Informational album details scraped from the album page
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumMetadata {
    /// Filesystem-safe album name
    pub name: String,
    /// Uploader display name
    pub uploader: String,
    /// Picture count the page claims (not authoritative)
    pub declared_pictures: Option<u32>,
}

/// Resolved downloadable URL for one image
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectLink(pub String);

impl DirectLink {
    /// Wrap a URL string
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Target file name: the final path segment of the URL, percent-decoded
    pub fn file_name(&self) -> Option<String> {
        crate::utils::file_name_from_url(&self.0)
    }
}

impl std::fmt::Display for DirectLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-album download tallies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// Files fetched and written in this run
    pub downloaded: usize,
    /// Files already present on disk
    pub skipped: usize,
    /// Links that failed to download
    pub failed: usize,
}

impl DownloadSummary {
    /// Number of links that were attempted
    pub fn total(&self) -> usize {
        self.downloaded + self.skipped + self.failed
    }
}

/// Terminal outcome of processing one album
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlbumOutcome {
    /// Album downloaded (possibly with per-item failures); recorded in the completed log
    Completed(DownloadSummary),
    /// Site reported the album missing; recorded in the blocked log
    Blocked,
    /// Album page listed no images; recorded in the blocked log
    Empty,
}

impl AlbumOutcome {
    /// Whether this outcome is written to the blocked log
    pub fn is_blocked_log(&self) -> bool {
        matches!(self, AlbumOutcome::Blocked | AlbumOutcome::Empty)
    }

    /// Treat anything but a completed album as an error
    pub fn ensure_completed(self, id: AlbumId) -> crate::error::Result<DownloadSummary> {
        match self {
            AlbumOutcome::Completed(summary) => Ok(summary),
            AlbumOutcome::Blocked => Err(crate::error::Error::AlbumBlocked { id: id.get() }),
            AlbumOutcome::Empty => Err(crate::error::Error::EmptyAlbum { id: id.get() }),
        }
    }
}

/// Counters for a whole pending-list run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListSummary {
    /// Albums recorded as completed
    pub completed: usize,
    /// Albums recorded as blocked
    pub blocked: usize,
    /// Albums with no image pages (also recorded as blocked)
    pub empty: usize,
    /// Albums that aborted and were requeued
    pub failed: usize,
    /// Entries left untouched (unresolvable)
    pub skipped: usize,
    /// Entries repeating an album already handled in this run
    pub duplicates: usize,
}

/// Pipeline progress events
///
/// Broadcast to every subscriber; a run with no subscribers simply drops them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Album processing started
    AlbumStarted {
        /// Album ID
        id: AlbumId,
        /// Album page URL
        url: String,
    },

    /// Album page parsed
    AlbumDetails {
        /// Album ID
        id: AlbumId,
        /// Scraped metadata
        metadata: AlbumMetadata,
        /// Image pages found on the album page
        image_pages: usize,
    },

    /// Site reported the album missing
    AlbumBlocked {
        /// Album ID
        id: AlbumId,
    },

    /// Album page listed no images
    AlbumEmpty {
        /// Album ID
        id: AlbumId,
    },

    /// Link resolution stage finished
    LinksResolved {
        /// Album ID
        id: AlbumId,
        /// Direct links obtained
        resolved: usize,
        /// Image pages attempted
        total: usize,
    },

    /// One image written to disk
    ImageDownloaded {
        /// Album ID
        id: AlbumId,
        /// Written file
        path: PathBuf,
    },

    /// Image already present on disk
    ImageSkipped {
        /// Album ID
        id: AlbumId,
        /// Existing file
        path: PathBuf,
    },

    /// One image failed to download
    ImageFailed {
        /// Album ID
        id: AlbumId,
        /// Direct link
        url: String,
        /// Error message
        error: String,
    },

    /// Album recorded as completed
    AlbumCompleted {
        /// Album ID
        id: AlbumId,
        /// Download tallies
        summary: DownloadSummary,
    },

    /// Album aborted by a non-terminal error
    AlbumFailed {
        /// Album ID
        id: AlbumId,
        /// Error message
        error: String,
    },

    /// Pending-list run finished
    ListFinished {
        /// Run tallies
        summary: ListSummary,
    },
}
