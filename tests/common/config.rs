//! Test configuration helpers for creating downloaders against a fake site

use luscious_dl::{AlbumDownloader, Config};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// Config with every path inside `dir` and the site at `base_url`
pub fn test_config(dir: &Path, base_url: &str) -> Config {
    let mut config = Config::default();
    config.output_dir = dir.join("Albums");
    config.site_base_url = base_url.to_string();
    config.request_timeout = Duration::from_secs(5);
    config.worklist.pending_file = dir.join("list.txt");
    config.worklist.blocked_file = dir.join("list_blocked.txt");
    config.worklist.completed_file = dir.join("list_completed.txt");
    config
}

/// HTTP-backed downloader for `base_url`, rooted in a fresh temp dir
///
/// Returns the downloader and the tempdir (which must be kept alive).
pub async fn create_http_downloader(
    base_url: &str,
    adjust: impl FnOnce(&mut Config),
) -> (AlbumDownloader, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let mut config = test_config(temp_dir.path(), base_url);
    adjust(&mut config);
    let downloader = AlbumDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

/// Overwrite the pending list
pub fn write_pending(downloader: &AlbumDownloader, entries: &[&str]) {
    let mut content = entries.join("\n");
    content.push('\n');
    std::fs::write(downloader.worklist().pending_path(), content).unwrap();
}

/// Sorted file names inside `dir`
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
