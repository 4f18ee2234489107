//! # luscious-dl
//!
//! Resumable bulk downloader for picture albums.
//!
//! ## Design Philosophy
//!
//! luscious-dl is designed to be:
//! - **Resumable** - A plain-text worklist records every album's fate, and files
//!   already on disk are never fetched twice
//! - **Sensible defaults** - A missing config file is created with working defaults
//! - **Injectable** - Page and byte fetching sit behind traits, so a rendering
//!   browser, plain HTTP, or an in-memory fake can drive the same pipeline
//! - **Event-driven** - Consumers subscribe to progress events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use luscious_dl::{AlbumDownloader, Config, cancel_on_signal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = AlbumDownloader::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     // One album right away, then whatever is queued in list.txt
//!     downloader
//!         .process_url("https://members.luscious.net/albums/some-title_12345/")
//!         .await?;
//!     let summary = downloader.process_pending(&cancel_on_signal()).await?;
//!     println!("{} albums completed", summary.completed);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Album pipeline (decomposed into focused submodules)
pub mod downloader;
/// Error types
pub mod error;
/// HTML extraction for album and image pages
pub mod extractor;
/// Fetch capabilities and the HTTP implementation
pub mod fetcher;
/// Album and user identifier resolution
pub mod resolver;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;
/// Pending, blocked, and completed worklist files
pub mod worklist;

// Re-export commonly used types
pub use config::{Config, DEFAULT_CONFIG_PATH, ExecutionMode, WorklistConfig};
pub use downloader::{AlbumDownloader, Fetchers};
pub use error::{Error, Result};
pub use fetcher::{ByteFetcher, HttpFetcher, PageFetcher};
pub use resolver::{extract_album_id, extract_ids_from_list, extract_user_id, is_valid_id};
pub use types::{
    AlbumId, AlbumMetadata, AlbumOutcome, AlbumRef, DirectLink, DownloadSummary, Event,
    ListSummary, UserId,
};
pub use worklist::WorklistStore;

/// Cancellation token that fires on the first termination signal.
///
/// Hand it to [`AlbumDownloader::process_pending`] so Ctrl+C stops a list run
/// between albums instead of killing it mid-write.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with a Ctrl+C fallback if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Must be called from within a tokio runtime.
pub fn cancel_on_signal() -> tokio_util::sync::CancellationToken {
    let token = tokio_util::sync::CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Finishing the current album before stopping");
        trigger.cancel();
    });
    token
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register signal handlers, using ctrl_c fallback");
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
                // No listener, so never fire
                std::future::pending::<()>().await;
            }
            tracing::info!("Received Ctrl+C signal");
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            std::future::pending::<()>().await;
        }
    }
}
