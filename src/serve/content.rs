//! Content serving module
//!
//! Resolves a filesystem location into a response plan: entity snapshot,
//! media type, and a full-body, single-range, or multipart byte-ranges body
//! per the incoming range request.

use std::io::{self, SeekFrom};
use std::path::Path;

use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use hyper::Method;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::config::Config;
use crate::http::mime::MediaTypeResolver;
use crate::http::range::{self, ByteRange, RangePart, RangePlan, ResolvedRange};
use crate::logger;
use crate::serve::entity::{ChunkStream, ContentEntity};
use crate::serve::{BodyPlan, ContentBody, ServeError, ServeOutcome, ServePlan};

/// Stateless content server
///
/// Holds only configuration; every request takes a fresh snapshot of the
/// target, so repeated identical requests produce identical plans.
#[derive(Debug, Clone)]
pub struct ContentServer {
    resolver: MediaTypeResolver,
    chunking_threshold: u64,
    chunk_size: usize,
    coalescing_threshold: u64,
    access_log: bool,
}

impl ContentServer {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            resolver: MediaTypeResolver::with_types(config.media.custom_types.clone()),
            chunking_threshold: config.serve.file_chunking_threshold_size,
            chunk_size: config.serve.file_chunking_chunk_size,
            coalescing_threshold: config.serve.range_coalescing_threshold,
            access_log: config.logging.access_log,
        }
    }

    /// Whether this engine serves the given method at all
    fn handles(method: &Method) -> bool {
        *method == Method::GET || *method == Method::HEAD
    }

    /// Serve an already-resolved filesystem location
    ///
    /// Non-GET/HEAD methods, missing targets, and directories yield
    /// `NotHandled` so the outer router can try other routes. Requested
    /// ranges are resolved and coalesced; if none is satisfiable the
    /// outcome is `RangeNotSatisfiable` (the strict 416 policy - a
    /// malformed `Range` header should instead be dropped by the caller
    /// before it gets here, which serves the full entity).
    pub async fn serve(
        &self,
        method: &Method,
        path: &Path,
        ranges: Option<&[ByteRange]>,
    ) -> Result<ServeOutcome, ServeError> {
        if !Self::handles(method) {
            return Ok(ServeOutcome::NotHandled);
        }

        let metadata = match fs::metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(ServeOutcome::NotHandled);
            }
            Err(e) => return Err(ServeError::io(path, e)),
        };
        if metadata.is_dir() {
            return Ok(ServeOutcome::NotHandled);
        }

        let modified = metadata.modified().map_err(|e| ServeError::io(path, e))?;
        let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let entity = ContentEntity {
            path: path.to_path_buf(),
            length: metadata.len(),
            modified: DateTime::<Utc>::from(modified),
            media_type: self.resolver.resolve(filename).to_string(),
        };

        let plan = ranges.map_or(RangePlan::NoRange, |ranges| {
            range::plan(ranges, entity.length, self.coalescing_threshold)
        });

        let (status, body) = match plan {
            RangePlan::NoRange => {
                let body = self.body_for(path, 0, entity.length).await?;
                (200, BodyPlan::Full(body))
            }
            RangePlan::Single(range) => {
                let body = self.body_for(path, range.first, range.byte_len()).await?;
                (206, BodyPlan::SingleRange { range, body })
            }
            RangePlan::Multi(ranges) => {
                let parts = read_parts(path, &ranges).await?;
                (206, BodyPlan::MultiRange { parts })
            }
            RangePlan::Unsatisfiable => {
                return Ok(ServeOutcome::RangeNotSatisfiable {
                    entity_length: entity.length,
                });
            }
        };

        if self.access_log {
            logger::log_served(path, status, body_len(&body));
        }
        Ok(ServeOutcome::Served(ServePlan { entity, body }))
    }

    /// Serve an already-resolved in-memory resource (e.g. embedded assets)
    ///
    /// The embedding layer owns resource lookup; this plans media type and
    /// ranges over the handed-in bytes exactly like the filesystem path,
    /// minus the I/O. Bodies are always buffered; the bytes are already in
    /// memory.
    #[must_use]
    pub fn serve_resource(
        &self,
        method: &Method,
        name: &str,
        bytes: &Bytes,
        modified: DateTime<Utc>,
    ) -> ServeOutcome {
        self.serve_resource_ranges(method, name, bytes, modified, None)
    }

    /// Range-aware variant of [`Self::serve_resource`]
    #[must_use]
    pub fn serve_resource_ranges(
        &self,
        method: &Method,
        name: &str,
        bytes: &Bytes,
        modified: DateTime<Utc>,
        ranges: Option<&[ByteRange]>,
    ) -> ServeOutcome {
        if !Self::handles(method) {
            return ServeOutcome::NotHandled;
        }

        let entity = ContentEntity {
            path: Path::new(name).to_path_buf(),
            length: bytes.len() as u64,
            modified,
            media_type: self.resolver.resolve(name).to_string(),
        };

        let plan = ranges.map_or(RangePlan::NoRange, |ranges| {
            range::plan(ranges, entity.length, self.coalescing_threshold)
        });

        let body = match plan {
            RangePlan::NoRange => BodyPlan::Full(ContentBody::Buffered(bytes.clone())),
            RangePlan::Single(range) => BodyPlan::SingleRange {
                range,
                body: ContentBody::Buffered(slice_of(bytes, range)),
            },
            RangePlan::Multi(ranges) => BodyPlan::MultiRange {
                parts: ranges
                    .iter()
                    .map(|&range| RangePart {
                        range,
                        body: slice_of(bytes, range),
                    })
                    .collect(),
            },
            RangePlan::Unsatisfiable => {
                return ServeOutcome::RangeNotSatisfiable {
                    entity_length: entity.length,
                };
            }
        };
        ServeOutcome::Served(ServePlan { entity, body })
    }

    /// Serve a sub-path under a root directory
    ///
    /// Canonicalizes both ends and refuses targets that escape the root, so
    /// `..` segments and symlink tricks cannot reach outside it.
    pub async fn serve_under(
        &self,
        method: &Method,
        root: &Path,
        sub_path: &str,
        ranges: Option<&[ByteRange]>,
    ) -> Result<ServeOutcome, ServeError> {
        if !Self::handles(method) {
            return Ok(ServeOutcome::NotHandled);
        }

        let root_canonical = match fs::canonicalize(root).await {
            Ok(p) => p,
            Err(e) => {
                logger::log_warning(&format!(
                    "Serve root not found or inaccessible '{}': {e}",
                    root.display()
                ));
                return Ok(ServeOutcome::NotHandled);
            }
        };

        let joined = root_canonical.join(sub_path.trim_start_matches('/'));
        let target = match fs::canonicalize(&joined).await {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(ServeOutcome::NotHandled);
            }
            Err(e) => return Err(ServeError::io(&joined, e)),
        };
        if !target.starts_with(&root_canonical) {
            logger::log_warning(&format!(
                "Path traversal attempt blocked: {sub_path} -> {}",
                target.display()
            ));
            return Ok(ServeOutcome::NotHandled);
        }

        self.serve(method, &target, ranges).await
    }

    /// Choose buffered or chunked delivery for one contiguous slice
    async fn body_for(&self, path: &Path, first: u64, length: u64) -> Result<ContentBody, ServeError> {
        if length >= self.chunking_threshold {
            let stream = ChunkStream::open(path, first, length, self.chunk_size)
                .await
                .map_err(|e| ServeError::io(path, e))?;
            Ok(ContentBody::Chunked(stream))
        } else {
            let bytes = read_slice(path, first, length)
                .await
                .map_err(|e| ServeError::io(path, e))?;
            Ok(ContentBody::Buffered(bytes))
        }
    }
}

/// Zero-copy slice of an in-memory resource
///
/// The range is already resolved against the resource length, so the
/// offsets are known to fit.
fn slice_of(bytes: &Bytes, range: ResolvedRange) -> Bytes {
    let first = usize::try_from(range.first).unwrap_or(usize::MAX);
    let last = usize::try_from(range.last).unwrap_or(usize::MAX);
    bytes.slice(first..=last)
}

/// Read one contiguous slice of a file into memory
async fn read_slice(path: &Path, first: u64, length: u64) -> io::Result<Bytes> {
    let len = usize::try_from(length)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "slice too large to buffer"))?;

    let mut file = File::open(path).await?;
    if first > 0 {
        file.seek(SeekFrom::Start(first)).await?;
    }
    let mut buf = vec![0u8; len];
    // A short read means the entity changed underneath us; surface it
    // rather than framing a truncated body as success
    file.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}

/// Read every part of a multipart plan through one file handle
async fn read_parts(path: &Path, ranges: &[ResolvedRange]) -> Result<Vec<RangePart>, ServeError> {
    let mut file = File::open(path).await.map_err(|e| ServeError::io(path, e))?;

    let mut parts = Vec::with_capacity(ranges.len());
    for range in ranges {
        let len = usize::try_from(range.byte_len()).map_err(|_| {
            ServeError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "range too large to buffer"),
            )
        })?;
        file.seek(SeekFrom::Start(range.first))
            .await
            .map_err(|e| ServeError::io(path, e))?;
        let mut buf = vec![0u8; len];
        file.read_exact(&mut buf)
            .await
            .map_err(|e| ServeError::io(path, e))?;
        parts.push(RangePart {
            range: *range,
            body: Bytes::from(buf),
        });
    }
    Ok(parts)
}

/// Bytes the chosen body plan will put on the wire
fn body_len(body: &BodyPlan) -> u64 {
    match body {
        BodyPlan::Full(b) | BodyPlan::SingleRange { body: b, .. } => b.byte_len(),
        BodyPlan::MultiRange { parts } => {
            parts.iter().map(|p| p.range.byte_len()).sum()
        }
    }
}
