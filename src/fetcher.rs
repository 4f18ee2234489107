//! Fetch capabilities the pipeline depends on
//!
//! The pipeline never talks to the network directly. It receives a [`PageFetcher`]
//! for HTML and a [`ByteFetcher`] for image bytes, so a browser-backed renderer, a
//! plain HTTP client, or an in-memory fake can be swapped in.

use crate::config::Config;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Returns the HTML of a page
///
/// Implementations backed by a rendering engine must return only once the page is
/// fully loaded, i.e. scrolled until its height stops growing, so that every
/// thumbnail is present in the returned markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the (rendered) HTML for `url`
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// Returns the raw bytes behind a URL
#[async_trait]
pub trait ByteFetcher: Send + Sync {
    /// Fetch the body of `url`
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// Stateless HTTP implementation of both fetch capabilities
///
/// Every request carries the configured timeout, so a stalled server fails the one
/// item instead of blocking its worker forever. Cloning shares the connection pool.
///
/// Pages answered with `404 Not Found` or `410 Gone` still hand back their HTML, since
/// the site's not-found page is what marks an album as missing. Any other non-2xx
/// status, and every non-2xx for image bytes, is an [`Error::HttpStatus`].
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher with the given per-request timeout and User-Agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                Error::Io(std::io::Error::other(format!(
                    "Failed to create HTTP client: {}",
                    e
                )))
            })?;
        Ok(Self { client })
    }

    /// Build a fetcher from the configured timeout and User-Agent
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.request_timeout, &config.user_agent)
    }

    /// GET `url`, accepting 2xx plus any status `keep_body` allows
    async fn get(
        &self,
        url: &str,
        keep_body: impl Fn(StatusCode) -> bool,
    ) -> Result<reqwest::Response> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(url = %url, "Request timed out");
            }
            Error::Network(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if keep_body(status) {
            tracing::debug!(url = %url, status = status.as_u16(), "Keeping error page body");
            return Ok(response);
        }
        Err(Error::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

fn is_missing_page(status: StatusCode) -> bool {
    matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE)
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        Ok(self.get(url, is_missing_page).await?.text().await?)
    }
}

#[async_trait]
impl ByteFetcher for HttpFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get(url, |_| false).await?.bytes().await?.to_vec())
    }
}
