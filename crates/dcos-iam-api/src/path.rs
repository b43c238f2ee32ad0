// Path helpers
//
// IAM identifiers may contain `/` (ACL rids such as
// `dcos:adminrouter:service:marathon/app`). The ACS API expects those
// double-encoded inside a path segment, so `/` becomes `%252F` and
// nothing else is touched.

use url::Url;

use crate::error::Error;

/// Escape an identifier for use as a single path segment.
///
/// Replaces every `/` with the literal sequence `%252F`. No other
/// character is altered.
pub fn escape_id(id: &str) -> String {
    id.replace('/', "%252F")
}

/// Whether URL parsing would resolve `segment` away: `.`, `..` and their
/// `%2e` spellings.
pub(crate) fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Turn a configured cluster address into a base URL.
///
/// A bare host or `host:port` becomes `http://host/`; an explicit
/// `http://` or `https://` URL is kept as-is. The result always ends
/// with a single `/`.
pub fn normalize_base_url(address: &str) -> Result<Url, Error> {
    let trimmed = address.trim().trim_end_matches('/');
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    Ok(Url::parse(&format!("{with_scheme}/"))?)
}
