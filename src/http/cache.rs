//! HTTP cache control module
//!
//! Modification-time based conditional request handling: `Last-Modified`
//! header formatting and `If-Modified-Since` comparison.

use chrono::{DateTime, Utc};

/// Format a modification time as an HTTP date (RFC 7231 IMF-fixdate)
///
/// # Examples
/// ```
/// use chrono::{TimeZone, Utc};
/// use fileserv::http::cache::format_http_date;
///
/// let t = Utc.with_ymd_and_hms(1994, 11, 6, 8, 49, 37).unwrap();
/// assert_eq!(format_http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
/// ```
#[must_use]
pub fn format_http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date header value
///
/// Accepts the RFC 2822 family of formats, which covers the IMF-fixdate
/// format produced by `format_http_date`. Unparseable input yields `None`.
#[must_use]
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Check whether a client's `If-Modified-Since` header makes the entity fresh
///
/// HTTP dates carry second resolution, so the entity's modification time is
/// truncated to whole seconds before comparing. An absent or unparseable
/// header means the entity must be sent.
#[must_use]
pub fn not_modified(if_modified_since: Option<&str>, modified: DateTime<Utc>) -> bool {
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| modified.timestamp() <= since.timestamp())
}
