//! Serving entry points module
//!
//! The two front doors of the engine: [`ContentServer`] for single entities
//! (full bodies and byte ranges) and [`DirectoryLister`] for merged
//! directory indexes. Both are stateless; every request gets a fresh
//! snapshot of the filesystem and nothing is cached across calls.

pub mod content;
pub mod entity;
pub mod listing;

use std::io;
use std::path::PathBuf;

use hyper::body::Bytes;
use thiserror::Error;

use crate::http::range::{RangePart, ResolvedRange};

pub use content::ContentServer;
pub use entity::{ChunkStream, ContentEntity};
pub use listing::{DirectoryEntry, DirectoryLister, Listing, ListingOutcome};

/// Outcome of asking the engine to serve a location
///
/// `NotHandled` is a pass-through signal: the outer router should keep
/// trying other routes. It is returned for non-GET/HEAD methods, missing
/// targets, and directories. Real I/O faults are a [`ServeError`] instead.
#[derive(Debug)]
pub enum ServeOutcome {
    /// Not something this engine serves; let the router try the next route
    NotHandled,
    /// Ranges were requested but none is satisfiable (416)
    RangeNotSatisfiable {
        /// Total entity length, for the `Content-Range: bytes */len` header
        entity_length: u64,
    },
    /// A response plan ready for serialization
    Served(ServePlan),
}

/// A response plan: entity snapshot plus the body to send
#[derive(Debug)]
pub struct ServePlan {
    pub entity: ContentEntity,
    pub body: BodyPlan,
}

/// What the response body contains
#[derive(Debug)]
pub enum BodyPlan {
    /// Status 200, the whole entity
    Full(ContentBody),
    /// Status 206, one contiguous slice with a `Content-Range` header
    SingleRange {
        range: ResolvedRange,
        body: ContentBody,
    },
    /// Status 206, multipart/byteranges with one part per range
    MultiRange { parts: Vec<RangePart> },
}

/// Entity bytes, buffered or streamed
///
/// Bodies at or above the configured chunking threshold are streamed so a
/// large entity never has to sit in memory whole.
#[derive(Debug)]
pub enum ContentBody {
    Buffered(Bytes),
    Chunked(ChunkStream),
}

impl ContentBody {
    /// Number of bytes this body will produce
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        match self {
            Self::Buffered(bytes) => bytes.len() as u64,
            Self::Chunked(stream) => stream.total_len(),
        }
    }
}

/// A serving fault - distinct from `NotHandled`
///
/// Raised when the filesystem fails underneath us (permissions, a race with
/// deletion, a short read). Never used for ordinary misses.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ServeError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
