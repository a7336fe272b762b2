//! HTTP Range request parsing and planning module
//!
//! Range header parsing and byte-range planning for partial downloads,
//! compliant with RFC 7233. Supports multiple ranges per request; nearby
//! ranges are coalesced before serving to keep multipart overhead down.

use hyper::body::Bytes;

/// One requested byte range, before resolution against an entity length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-end` - explicit inclusive range
    FromTo(u64, u64),
    /// `bytes=start-` - from offset to end of entity
    From(u64),
    /// `bytes=-n` - last n bytes of the entity
    Suffix(u64),
}

/// A range resolved against a concrete entity length
///
/// Invariant: `first <= last < entity_length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    /// First byte position (inclusive)
    pub first: u64,
    /// Last byte position (inclusive)
    pub last: u64,
}

impl ResolvedRange {
    /// Number of bytes covered by this range
    #[inline]
    #[must_use]
    pub const fn byte_len(&self) -> u64 {
        self.last - self.first + 1
    }

    /// `Content-Range` header value for this range
    #[must_use]
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{}", self.first, self.last, total)
    }
}

/// A resolved range together with the bytes it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePart {
    pub range: ResolvedRange,
    pub body: Bytes,
}

/// Outcome of planning a range request against an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangePlan {
    /// No ranges requested - serve the full entity
    NoRange,
    /// Exactly one range survived - 206 with a `Content-Range` header
    Single(ResolvedRange),
    /// Two or more disjoint ranges - multipart/byteranges body
    Multi(Vec<ResolvedRange>),
    /// Ranges were requested but none is satisfiable - should return 416
    Unsatisfiable,
}

/// Parse an HTTP `Range` header into the requested ranges
///
/// Supported formats (bytes unit only, comma-separated list):
/// - `bytes=start-end` - Specific range
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// A malformed header is ignored entirely (returns `None`), which callers
/// treat the same as no `Range` header at all.
///
/// # Examples
/// ```
/// use fileserv::http::range::{parse_range_header, ByteRange};
///
/// let ranges = parse_range_header("bytes=0-99, -10").unwrap();
/// assert_eq!(ranges, vec![ByteRange::FromTo(0, 99), ByteRange::Suffix(10)]);
///
/// assert!(parse_range_header("lines=1-2").is_none());
/// ```
#[must_use]
pub fn parse_range_header(header: &str) -> Option<Vec<ByteRange>> {
    let spec = header.trim().strip_prefix("bytes=")?;
    if spec.is_empty() {
        return None;
    }

    let mut ranges = Vec::new();
    for part in spec.split(',') {
        ranges.push(parse_range_spec(part.trim())?);
    }
    Some(ranges)
}

/// Parse a single range spec (e.g. `0-99`, `100-`, `-500`)
fn parse_range_spec(spec: &str) -> Option<ByteRange> {
    let (start_str, end_str) = spec.split_once('-')?;
    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix range: "-500" means last 500 bytes
    if start_str.is_empty() {
        return end_str.parse().ok().map(ByteRange::Suffix);
    }

    let start = start_str.parse().ok()?;
    if end_str.is_empty() {
        return Some(ByteRange::From(start));
    }

    let end: u64 = end_str.parse().ok()?;
    if end < start {
        return None;
    }
    Some(ByteRange::FromTo(start, end))
}

impl ByteRange {
    /// Resolve against a concrete entity length
    ///
    /// Returns `None` when the range is unsatisfiable: start at or past the
    /// end of the entity, a zero-byte suffix, or any range over an empty
    /// entity. An end offset past the entity is clamped, not rejected.
    #[must_use]
    pub fn resolve(self, entity_length: u64) -> Option<ResolvedRange> {
        if entity_length == 0 {
            return None;
        }
        match self {
            Self::FromTo(start, end) => (start < entity_length).then(|| ResolvedRange {
                first: start,
                last: end.min(entity_length - 1),
            }),
            Self::From(start) => (start < entity_length).then(|| ResolvedRange {
                first: start,
                last: entity_length - 1,
            }),
            Self::Suffix(n) => (n > 0).then(|| ResolvedRange {
                first: entity_length.saturating_sub(n),
                last: entity_length - 1,
            }),
        }
    }
}

/// Plan how to serve a set of requested ranges
///
/// Each range is resolved against `entity_length`; unsatisfiable ranges are
/// dropped. Survivors are sorted by first byte and coalesced: two ranges
/// merge when they overlap or the gap between them is at most
/// `coalescing_threshold` bytes (threshold 0 merges only overlapping or
/// directly-adjacent ranges).
///
/// # Examples
/// ```
/// use fileserv::http::range::{plan, ByteRange, RangePlan, ResolvedRange};
///
/// let plan = plan(&[ByteRange::Suffix(10)], 26, 0);
/// assert_eq!(plan, RangePlan::Single(ResolvedRange { first: 16, last: 25 }));
/// ```
#[must_use]
pub fn plan(ranges: &[ByteRange], entity_length: u64, coalescing_threshold: u64) -> RangePlan {
    if ranges.is_empty() {
        return RangePlan::NoRange;
    }

    let mut resolved: Vec<ResolvedRange> = ranges
        .iter()
        .filter_map(|r| r.resolve(entity_length))
        .collect();
    if resolved.is_empty() {
        return RangePlan::Unsatisfiable;
    }

    resolved.sort_by_key(|r| r.first);

    let mut merged: Vec<ResolvedRange> = Vec::with_capacity(resolved.len());
    for range in resolved {
        match merged.last_mut() {
            // Merge when the next range starts within threshold of the
            // current one's end (first <= last + 1 + threshold)
            Some(prev)
                if range.first
                    <= prev.last.saturating_add(1).saturating_add(coalescing_threshold) =>
            {
                prev.last = prev.last.max(range.last);
            }
            _ => merged.push(range),
        }
    }

    if merged.len() == 1 {
        RangePlan::Single(merged[0])
    } else {
        RangePlan::Multi(merged)
    }
}
