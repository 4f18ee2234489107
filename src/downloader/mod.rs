//! Album ingestion pipeline split into focused submodules.
//!
//! The `AlbumDownloader` struct and its methods are organized by stage:
//! - [`album`] - Single album state machine (check, extract, resolve, download, record)
//! - [`links`] - Link resolution pool (image page to direct link)
//! - [`files`] - Download pool (direct link to file on disk)
//! - [`batch`] - Single URL and pending-list runs

mod album;
mod batch;
mod files;
mod links;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::fetcher::{ByteFetcher, HttpFetcher, PageFetcher};
use crate::types::Event;
use crate::worklist::WorklistStore;

/// Fetch capabilities injected into the pipeline
#[derive(Clone)]
pub struct Fetchers {
    /// Fetches album pages; also serves image pages when running sequentially
    pub session: Arc<dyn PageFetcher>,
    /// Stateless page fetcher shared by pooled link workers
    pub pages: Arc<dyn PageFetcher>,
    /// Fetches image bytes
    pub bytes: Arc<dyn ByteFetcher>,
}

impl Fetchers {
    /// Use one HTTP client for every capability
    pub fn http(config: &Config) -> Result<Self> {
        let http = Arc::new(HttpFetcher::from_config(config)?);
        Ok(Self {
            session: http.clone(),
            pages: http.clone(),
            bytes: http,
        })
    }
}

/// Main downloader instance (cloneable - all fields are cheap to clone)
#[derive(Clone)]
pub struct AlbumDownloader {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Parsed site base URL for qualifying relative links
    pub(crate) base_url: url::Url,
    /// Sole owner of the worklist files
    pub(crate) worklist: WorklistStore,
    /// Injected fetch capabilities
    pub(crate) fetchers: Fetchers,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl AlbumDownloader {
    /// Create a downloader that fetches over plain HTTP
    ///
    /// Validates the configuration and opens the worklist, creating any missing
    /// worklist file.
    pub async fn new(config: Config) -> Result<Self> {
        let fetchers = Fetchers::http(&config)?;
        Self::with_fetchers(config, fetchers).await
    }

    /// Create a downloader with caller-supplied fetch capabilities
    pub async fn with_fetchers(config: Config, fetchers: Fetchers) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?;
        let worklist = WorklistStore::open(&config.worklist).await?;

        // Buffer generously; a slow subscriber lags instead of stalling the pools
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        Ok(Self {
            config: Arc::new(config),
            base_url,
            worklist,
            fetchers,
            event_tx,
        })
    }

    /// Subscribe to pipeline events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The worklist this downloader records outcomes in
    pub fn worklist(&self) -> &WorklistStore {
        &self.worklist
    }

    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }
}
