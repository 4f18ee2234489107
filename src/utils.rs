//! Utility functions for file naming and path manipulation

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Characters outside word characters, `-`, `.` and space are unsafe in folder names
#[allow(clippy::expect_used)]
static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-. ]").expect("album name pattern is valid"));

/// Extract a file name from the final path segment of a URL
///
/// The segment is percent-decoded. Returns `None` when the URL does not parse or
/// has no usable final segment (e.g. a bare host or a trailing slash).
///
/// # Examples
///
/// ```
/// use luscious_dl::utils::file_name_from_url;
///
/// assert_eq!(
///     file_name_from_url("https://cdn.example.com/a/b/001.jpg").as_deref(),
///     Some("001.jpg")
/// );
/// assert_eq!(file_name_from_url("https://cdn.example.com/"), None);
/// ```
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let last_segment = parsed.path_segments()?.next_back()?;
    if last_segment.is_empty() {
        return None;
    }

    let decoded = urlencoding::decode(last_segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| last_segment.to_string());

    // A decoded separator would escape the album directory
    if decoded.contains('/') || decoded.contains('\\') || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded)
}

/// Make an album name safe to use as a folder name
///
/// Every character that is not a word character, `-`, `.` or space becomes `_`.
/// Surrounding whitespace is dropped first. Names that end up empty or consist only
/// of dots fall back to `album_<id>`.
pub fn sanitize_album_name(name: &str, fallback_id: u64) -> String {
    let sanitized = UNSAFE_NAME_CHARS.replace_all(name.trim(), "_").into_owned();
    if sanitized.trim_matches('.').trim().is_empty() {
        return format!("album_{fallback_id}");
    }
    sanitized
}

/// Folder an album is downloaded into: `<output_dir>/<album name>`
pub fn album_dir(output_dir: &Path, album_name: &str) -> PathBuf {
    output_dir.join(album_name)
}
