//! Identifier resolution for album and user URLs
//!
//! Everything here is pure: no I/O, no logging side effects beyond `tracing` when a
//! batch drops an unresolvable item. Album URLs have the shape
//! `.../albums/<title>_<id>/` and user URLs `.../users/<id>/`.

use crate::error::{Error, Result};
use crate::types::{AlbumId, AlbumRef, UserId};
use std::collections::HashSet;

/// Whether `token` converts losslessly to an integer
///
/// Surrounding whitespace is ignored and a sign is accepted, so `" 42 "` and `"-7"`
/// are valid while `"4.2"`, `"12abc"` and `""` are not. There is no size limit; a
/// token too large for `u64` is valid here but never resolves to an ID.
pub fn is_valid_id(token: &str) -> bool {
    let token = token.trim();
    let digits = token.strip_prefix(['+', '-']).unwrap_or(token);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a strictly positive ID
fn parse_positive(token: &str) -> Option<u64> {
    if !is_valid_id(token) {
        return None;
    }
    token.trim().parse::<u64>().ok().filter(|id| *id > 0)
}

/// Last path segment of a URL, ignoring one trailing slash
///
/// Returns `None` when the input has no `/` at all.
fn last_segment(url: &str) -> Option<&str> {
    let trimmed = url.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.rsplit_once('/').map(|(_, segment)| segment)
}

/// Extract the album ID from an album URL
///
/// # Examples
///
/// ```
/// use luscious_dl::resolver::extract_album_id;
///
/// let id = extract_album_id("https://www.luscious.net/albums/some-title_12345/").unwrap();
/// assert_eq!(id.get(), 12345);
/// assert!(extract_album_id("https://www.luscious.net/albums/no-id/").is_err());
/// ```
pub fn extract_album_id(album_url: &str) -> Result<AlbumId> {
    last_segment(album_url)
        .and_then(|segment| segment.rsplit_once('_'))
        .and_then(|(_, suffix)| parse_positive(suffix))
        .map(AlbumId)
        .ok_or_else(|| Error::unresolvable(album_url.trim()))
}

/// Extract the user ID from a user profile URL
pub fn extract_user_id(user_url: &str) -> Result<UserId> {
    last_segment(user_url)
        .and_then(parse_positive)
        .map(UserId)
        .ok_or_else(|| Error::unresolvable(user_url.trim()))
}

/// Extract IDs from a mixed list of URLs and bare IDs
///
/// Bare integers are used as-is, everything else goes through `extractor`. Items that
/// fail to resolve are logged and dropped; duplicates collapse. The result carries no
/// ordering guarantee.
pub fn extract_ids_from_list<I, S, F, T>(items: I, extractor: F) -> HashSet<u64>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: Fn(&str) -> Result<T>,
    T: Into<u64>,
{
    items
        .into_iter()
        .filter_map(|item| {
            let item = item.as_ref();
            let resolved = if is_valid_id(item) {
                parse_positive(item).ok_or_else(|| Error::unresolvable(item.trim()))
            } else {
                extractor(item).map(Into::into)
            };
            match resolved {
                Ok(id) => Some(id),
                Err(e) => {
                    tracing::warn!(item = %item.trim(), error = %e, "Dropping unresolvable item");
                    None
                }
            }
        })
        .collect()
}

impl AlbumRef {
    /// Validate user or worklist input into an album reference
    ///
    /// Bare IDs are turned into an album page URL under `base_url`; URLs are kept
    /// verbatim. Anything that does not resolve to an album ID is rejected.
    pub fn parse(input: &str, base_url: &url::Url) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(Error::unresolvable(raw));
        }

        if is_valid_id(raw) {
            let id = parse_positive(raw)
                .map(AlbumId)
                .ok_or_else(|| Error::unresolvable(raw))?;
            let url = base_url.join(&format!("albums/_{id}/"))?;
            return Ok(Self {
                id,
                url: url.to_string(),
                raw: raw.to_string(),
            });
        }

        let id = extract_album_id(raw)?;
        Ok(Self {
            id,
            url: raw.to_string(),
            raw: raw.to_string(),
        })
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> url::Url {
        url::Url::parse("https://members.luscious.net/").unwrap()
    }

    #[test]
    fn valid_ids_are_integers_only() {
        for token in [
            "0",
            "42",
            " 42 ",
            "-7",
            "+8",
            "9223372036854775807",
            "123456789012345678901234567890",
        ] {
            assert!(is_valid_id(token), "{token:?} should be valid");
        }
        for token in ["", " ", "+", "-", "+-1", "4.2", "12abc", "abc", "1e3", "0x10", "١٢"] {
            assert!(!is_valid_id(token), "{token:?} should be invalid");
        }
    }

    #[test]
    fn album_id_with_and_without_trailing_slash() {
        for url in [
            "https://www.luscious.net/albums/some-title_12345/",
            "https://www.luscious.net/albums/some-title_12345",
            "https://www.luscious.net/albums/multi_part_title_12345/",
            "  https://www.luscious.net/albums/some-title_12345/\n",
        ] {
            assert_eq!(extract_album_id(url).unwrap(), AlbumId(12345), "{url}");
        }
    }

    #[test]
    fn album_id_rejects_urls_without_trailing_integer() {
        for url in [
            "https://www.luscious.net/albums/some-title/",
            "https://www.luscious.net/albums/some-title_abc/",
            "https://www.luscious.net/albums/some-title_/",
            "https://www.luscious.net/albums/some-title_0/",
            "https://www.luscious.net/albums/some-title_-5/",
            "no-slashes_123",
            "",
        ] {
            let err = extract_album_id(url).unwrap_err();
            assert!(matches!(err, Error::UnresolvableId { .. }), "{url}");
        }
    }

    #[test]
    fn user_id_is_last_segment() {
        assert_eq!(
            extract_user_id("https://www.luscious.net/users/98765/").unwrap(),
            UserId(98765)
        );
        assert_eq!(
            extract_user_id("https://www.luscious.net/users/98765").unwrap(),
            UserId(98765)
        );
        assert!(extract_user_id("https://www.luscious.net/users/someone/").is_err());
    }

    #[test]
    fn list_extraction_filters_failures_and_duplicates() {
        let items = [
            "https://www.luscious.net/albums/a_1/",
            "1",
            "2",
            "https://www.luscious.net/albums/b_3",
            "https://www.luscious.net/albums/broken/",
            "https://www.luscious.net/albums/a_1",
            "-4",
        ];
        let ids = extract_ids_from_list(items, extract_album_id);
        assert_eq!(ids, HashSet::from([1, 2, 3]));
    }

    #[test]
    fn list_extraction_with_user_extractor() {
        let items = vec![
            "https://www.luscious.net/users/10/".to_string(),
            "11".to_string(),
            "https://www.luscious.net/users/nobody/".to_string(),
        ];
        let ids = extract_ids_from_list(&items, extract_user_id);
        assert_eq!(ids, HashSet::from([10, 11]));
    }

    #[test]
    fn album_ref_from_url_keeps_url() {
        let r = AlbumRef::parse(" https://www.luscious.net/albums/foo_12345/ ", &base()).unwrap();
        assert_eq!(r.id, AlbumId(12345));
        assert_eq!(r.url, "https://www.luscious.net/albums/foo_12345/");
        assert_eq!(r.raw, "https://www.luscious.net/albums/foo_12345/");
    }

    #[test]
    fn album_ref_from_bare_id_builds_url() {
        let r = AlbumRef::parse("777", &base()).unwrap();
        assert_eq!(r.id, AlbumId(777));
        assert_eq!(r.url, "https://members.luscious.net/albums/_777/");
        assert_eq!(extract_album_id(&r.url).unwrap(), r.id);
    }

    #[test]
    fn album_ref_rejects_garbage() {
        assert!(AlbumRef::parse("", &base()).is_err());
        assert!(AlbumRef::parse("0", &base()).is_err());
        assert!(matches!(
            AlbumRef::parse("123456789012345678901234567890", &base()),
            Err(Error::UnresolvableId { .. })
        ));
        assert!(AlbumRef::parse("https://www.luscious.net/albums/x/", &base()).is_err());
    }
}
