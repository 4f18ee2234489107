//! Link resolution pool: maps image pages to direct download links.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use url::Url;

use crate::config::ExecutionMode;
use crate::error::{Error, Result};
use crate::extractor::parse_direct_link;
use crate::fetcher::PageFetcher;
use crate::types::DirectLink;

use super::AlbumDownloader;

impl AlbumDownloader {
    /// Resolve every image page to its direct link
    ///
    /// Sequential mode walks the pages in order through the session fetcher. Pooled
    /// mode runs up to `link_pool_size` stateless fetches at once and returns links in
    /// completion order. Pages that fail are logged and left out, so the result may be
    /// shorter than the input.
    pub async fn resolve_links(&self, image_pages: &[Url]) -> Vec<DirectLink> {
        match self.config.link_mode() {
            ExecutionMode::Sequential => {
                tracing::info!(pages = image_pages.len(), "Getting direct image links");
                resolve_links_with(&self.fetchers.session, image_pages, ExecutionMode::Sequential)
                    .await
            }
            mode @ ExecutionMode::Pooled(_) => {
                tracing::info!(
                    pages = image_pages.len(),
                    workers = mode.width(),
                    "Getting direct image links with worker pool"
                );
                resolve_links_with(&self.fetchers.pages, image_pages, mode).await
            }
        }
    }
}

/// Resolve `image_pages` through `fetcher` with the given scheduling
pub(crate) async fn resolve_links_with(
    fetcher: &Arc<dyn PageFetcher>,
    image_pages: &[Url],
    mode: ExecutionMode,
) -> Vec<DirectLink> {
    let results: Vec<Result<DirectLink>> = match mode {
        ExecutionMode::Sequential => {
            let mut results = Vec::with_capacity(image_pages.len());
            for page in image_pages {
                results.push(resolve_one(fetcher.as_ref(), page).await);
            }
            results
        }
        ExecutionMode::Pooled(_) => {
            stream::iter(image_pages)
                .map(|page| {
                    let fetcher = Arc::clone(fetcher);
                    async move { resolve_one(fetcher.as_ref(), page).await }
                })
                .buffer_unordered(mode.width())
                .collect()
                .await
        }
    };

    let total = results.len();
    let links: Vec<DirectLink> = results
        .into_iter()
        .filter_map(|result| match result {
            Ok(link) => Some(link),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get link");
                None
            }
        })
        .collect();

    if links.len() < total {
        tracing::warn!(
            resolved = links.len(),
            failed = total - links.len(),
            "Some image pages did not yield a direct link"
        );
    }
    links
}

async fn resolve_one(fetcher: &dyn PageFetcher, page: &Url) -> Result<DirectLink> {
    let html = fetcher
        .fetch_html(page.as_str())
        .await
        .map_err(|e| Error::LinkResolution {
            url: page.to_string(),
            reason: e.to_string(),
        })?;
    parse_direct_link(&html, page)
}
