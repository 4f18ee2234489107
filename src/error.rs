//! Error types for luscious-dl
//!
//! A single [`Error`] enum covers the whole pipeline:
//! - Identifier resolution failures at the input boundary
//! - Album-level terminal states (blocked, empty) for callers that want error-style flow
//! - Per-item link resolution and download failures (swallowed by the worker pools)
//! - Transport, filesystem, and configuration errors

use thiserror::Error;

/// Result type alias for luscious-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for luscious-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Input could not be resolved to a numeric album or user ID
    #[error("couldn't resolve an ID from '{input}'")]
    UnresolvableId {
        /// The offending URL or token
        input: String,
    },

    /// The site reports the album as absent
    #[error("album {id} is blocked or missing")]
    AlbumBlocked {
        /// Album ID
        id: u64,
    },

    /// The album page contained no image pages
    #[error("album {id} has no image pages")]
    EmptyAlbum {
        /// Album ID
        id: u64,
    },

    /// An image page could not be mapped to its direct download link
    #[error("failed to resolve direct link from {url}: {reason}")]
    LinkResolution {
        /// Image page URL
        url: String,
        /// Why resolution failed
        reason: String,
    },

    /// A direct link could not be downloaded to disk
    #[error("failed to download {url}: {reason}")]
    DownloadFailed {
        /// Direct link URL
        url: String,
        /// Why the download failed
        reason: String,
    },

    /// Non-success HTTP response
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "link_pool_size")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Malformed URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`Error::UnresolvableId`] for the given input
    pub fn unresolvable(input: impl Into<String>) -> Self {
        Self::UnresolvableId {
            input: input.into(),
        }
    }
}
