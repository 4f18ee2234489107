use super::test_helpers::{
    MockFetcher, NOT_FOUND_HTML, TEST_BASE_URL, album_page_html, create_test_downloader,
    create_test_downloader_with, drain_events, mount_album, test_config, write_pending,
};
use super::*;
use crate::error::Error;
use crate::types::{AlbumOutcome, Event};
