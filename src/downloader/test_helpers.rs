//! Shared test helpers: an in-memory fetcher and site fixtures.

use crate::config::Config;
use crate::downloader::{AlbumDownloader, Fetchers};
use crate::error::{Error, Result};
use crate::fetcher::{ByteFetcher, PageFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::tempdir;

/// Site root every fixture is served under
pub(crate) const TEST_BASE_URL: &str = "https://site.test/";

/// Markup the site serves for a missing album
pub(crate) const NOT_FOUND_HTML: &str =
    r#"<html><body><div id="frontpage"><h1>404 Not Found</h1></div></body></html>"#;

/// In-memory page and byte fetcher
///
/// Unknown URLs fail with a 404. Every call is counted and the peak number of calls
/// in flight at once is tracked, so pool width can be asserted on.
#[derive(Default)]
pub(crate) struct MockFetcher {
    pages: Mutex<HashMap<String, String>>,
    bytes: Mutex<HashMap<String, Vec<u8>>>,
    page_calls: AtomicUsize,
    byte_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockFetcher {
    pub(crate) fn add_page(&self, url: &str, html: impl Into<String>) {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), html.into());
    }

    pub(crate) fn add_bytes(&self, url: &str, bytes: Vec<u8>) {
        self.bytes.lock().unwrap().insert(url.to_string(), bytes);
    }

    pub(crate) fn remove_page(&self, url: &str) {
        self.pages.lock().unwrap().remove(url);
    }

    pub(crate) fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn byte_calls(&self) -> usize {
        self.byte_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn track<T>(&self, lookup: impl FnOnce() -> Option<T>, url: &str) -> Result<T> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // Give sibling workers a chance to start so overlap is observable
        tokio::time::sleep(Duration::from_millis(5)).await;
        let result = lookup().ok_or_else(|| Error::HttpStatus {
            url: url.to_string(),
            status: 404,
        });

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.track(|| self.pages.lock().unwrap().get(url).cloned(), url)
            .await
    }
}

#[async_trait]
impl ByteFetcher for MockFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.byte_calls.fetch_add(1, Ordering::SeqCst);
        self.track(|| self.bytes.lock().unwrap().get(url).cloned(), url)
            .await
    }
}

/// Image page carrying a single download anchor
pub(crate) fn image_page_html(direct_link: &str) -> String {
    format!(
        r#"<html><body><div class="picture"><img src="preview.jpg"></div>
        <a class="icon-download" href="{direct_link}">Download</a></body></html>"#
    )
}

/// Album page with the given name and thumbnail links
pub(crate) fn album_page_html(name: &str, image_pages: &[String]) -> String {
    let thumbs: String = image_pages
        .iter()
        .map(|href| {
            format!(r#"<div class="item thumbnail ic_container"><a href="{href}"><img src="t.jpg"></a></div>"#)
        })
        .collect();
    format!(
        r#"<html><body>
        <ul id="single_album_details">
          <li><h2>{name}</h2></li>
          <li><div><p>{count} pictures</p></div></li>
        </ul>
        <a class="user_lnk" href="/users/42/">tester</a>
        <div class="picture_page">{thumbs}</div>
        </body></html>"#,
        count = image_pages.len()
    )
}

/// Serve a complete album from `mock`
///
/// Registers the album page at `album_url`, one image page per picture and the bytes
/// behind every direct link. Returns the direct links in page order.
pub(crate) fn mount_album(
    mock: &MockFetcher,
    album_url: &str,
    id: u64,
    name: &str,
    pictures: usize,
) -> Vec<String> {
    let mut image_pages = Vec::with_capacity(pictures);
    let mut links = Vec::with_capacity(pictures);
    for i in 1..=pictures {
        let page = format!("{TEST_BASE_URL}albums/a_{id}/pictures/{i}/");
        let link = format!("https://cdn.site.test/{id}/{i:03}.jpg");
        mock.add_page(&page, image_page_html(&link));
        mock.add_bytes(&link, format!("album {id} picture {i}").into_bytes());
        image_pages.push(page);
        links.push(link);
    }
    mock.add_page(album_url, album_page_html(name, &image_pages));
    links
}

/// Config rooted in `dir` and pointed at the fixture site
pub(crate) fn test_config(dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.output_dir = dir.join("Albums");
    config.site_base_url = TEST_BASE_URL.to_string();
    config.worklist.pending_file = dir.join("list.txt");
    config.worklist.blocked_file = dir.join("list_blocked.txt");
    config.worklist.completed_file = dir.join("list_completed.txt");
    config
}

/// Helper to create a test AlbumDownloader backed by a [`MockFetcher`].
/// Returns the downloader, the tempdir (which must be kept alive), and the mock.
pub(crate) async fn create_test_downloader()
-> (AlbumDownloader, tempfile::TempDir, Arc<MockFetcher>) {
    create_test_downloader_with(|_| {}).await
}

/// Same as [`create_test_downloader`], letting the caller adjust the config first
pub(crate) async fn create_test_downloader_with(
    adjust: impl FnOnce(&mut Config),
) -> (AlbumDownloader, tempfile::TempDir, Arc<MockFetcher>) {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(temp_dir.path());
    adjust(&mut config);

    let mock = Arc::new(MockFetcher::default());
    let fetchers = Fetchers {
        session: mock.clone(),
        pages: mock.clone(),
        bytes: mock.clone(),
    };

    let downloader = AlbumDownloader::with_fetchers(config, fetchers)
        .await
        .unwrap();
    (downloader, temp_dir, mock)
}

/// Overwrite the pending list with `entries`
pub(crate) fn write_pending(downloader: &AlbumDownloader, entries: &[&str]) {
    let mut content = entries.join("\n");
    content.push('\n');
    std::fs::write(downloader.worklist().pending_path(), content).unwrap();
}

/// Drain every event currently buffered on `rx`
pub(crate) fn drain_events(
    rx: &mut tokio::sync::broadcast::Receiver<crate::types::Event>,
) -> Vec<crate::types::Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
