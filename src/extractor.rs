//! Album and image page extraction
//!
//! Works on HTML the page fetcher already rendered; scrolling until all thumbnails
//! are present is the fetcher's job. Only four structural points are read:
//! - the not-found marker (`#frontpage > h1`)
//! - album details (`#single_album_details`, `.user_lnk`)
//! - thumbnail anchors (`.item.thumbnail.ic_container > a`)
//! - the download anchor of an image page (`.icon-download`)

use crate::error::{Error, Result};
use crate::types::{AlbumId, AlbumMetadata, DirectLink};
use crate::utils::sanitize_album_name;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Heading text the site shows for a removed or hidden album
pub const NOT_FOUND_MARKER: &str = "404 Not Found";

#[allow(clippy::expect_used)]
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static NOT_FOUND_HEADING: LazyLock<Selector> = LazyLock::new(|| selector("#frontpage > h1"));
static ALBUM_NAME: LazyLock<Selector> =
    LazyLock::new(|| selector("#single_album_details > li:nth-of-type(1) > h2"));
static UPLOADER: LazyLock<Selector> = LazyLock::new(|| selector(".user_lnk"));
static PICTURE_COUNT: LazyLock<Selector> = LazyLock::new(|| {
    selector("#single_album_details > li:nth-of-type(2) > div > p:nth-of-type(1)")
});
static THUMBNAIL_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| selector(".item.thumbnail.ic_container > a[href]"));
static DOWNLOAD_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| selector(".icon-download[href]"));

#[allow(clippy::expect_used)]
static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*").expect("number pattern is valid"));

/// What an album page turned out to be
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlbumPage {
    /// The site reported the album missing
    Blocked,
    /// A live album
    Album {
        /// Scraped details
        metadata: AlbumMetadata,
        /// Absolute image page URLs in page order
        image_pages: Vec<Url>,
    },
}

/// Classify and parse an album page
///
/// A page carrying the not-found marker is [`AlbumPage::Blocked`] and nothing else is
/// read from it. A live page with no thumbnails fails with [`Error::EmptyAlbum`].
/// Relative thumbnail links are qualified against `base_url`.
pub fn parse_album_page(html: &str, id: AlbumId, base_url: &Url) -> Result<AlbumPage> {
    let document = Html::parse_document(html);

    if is_not_found(&document) {
        return Ok(AlbumPage::Blocked);
    }

    let metadata = AlbumMetadata {
        name: sanitize_album_name(&first_text(&document, &ALBUM_NAME), id.get()),
        uploader: first_text(&document, &UPLOADER),
        declared_pictures: parse_count(&first_text(&document, &PICTURE_COUNT)),
    };

    let image_pages: Vec<Url> = document
        .select(&THUMBNAIL_ANCHOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| match base_url.join(href.trim()) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(album_id = %id, href = %href, error = %e, "Skipping unparsable image page link");
                None
            }
        })
        .collect();

    if image_pages.is_empty() {
        return Err(Error::EmptyAlbum { id: id.get() });
    }

    Ok(AlbumPage::Album {
        metadata,
        image_pages,
    })
}

/// Pull the direct download link out of an image page
pub fn parse_direct_link(html: &str, page_url: &Url) -> Result<DirectLink> {
    let document = Html::parse_document(html);
    let href = document
        .select(&DOWNLOAD_ANCHOR)
        .find_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(|| Error::LinkResolution {
            url: page_url.to_string(),
            reason: "no download anchor on page".into(),
        })?;

    let link = page_url.join(href).map_err(|e| Error::LinkResolution {
        url: page_url.to_string(),
        reason: format!("invalid download href '{href}': {e}"),
    })?;
    Ok(DirectLink::new(link.to_string()))
}

fn is_not_found(document: &Html) -> bool {
    first_text(document, &NOT_FOUND_HEADING) == NOT_FOUND_MARKER
}

fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

fn parse_count(text: &str) -> Option<u32> {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}
