//! Content entity module
//!
//! Per-request snapshots of served entities and the chunked reader used for
//! large bodies.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use hyper::body::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

use crate::http::cache;

/// Immutable snapshot of an entity at resolution time
///
/// Taken fresh for every request; nothing is shared or cached between
/// requests, so concurrent serving needs no coordination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntity {
    /// Resolved filesystem location
    pub path: PathBuf,
    /// Entity length in bytes at snapshot time
    pub length: u64,
    /// Filesystem modification time at snapshot time
    pub modified: DateTime<Utc>,
    /// Media type resolved from the filename extension
    pub media_type: String,
}

impl ContentEntity {
    /// `Last-Modified` header value for this snapshot
    #[must_use]
    pub fn http_date(&self) -> String {
        cache::format_http_date(self.modified)
    }
}

/// Pull-based chunked reader over a file slice
///
/// Produces fixed-size chunks until the slice is exhausted; the consumer
/// cancels by simply dropping the stream. A read that comes up short
/// (entity truncated mid-request) is an error, never a silently shortened
/// body.
#[derive(Debug)]
pub struct ChunkStream {
    file: File,
    total: u64,
    remaining: u64,
    chunk_size: usize,
}

impl ChunkStream {
    /// Open a file and position it at the start of the slice
    pub(crate) async fn open(
        path: &Path,
        first: u64,
        length: u64,
        chunk_size: usize,
    ) -> io::Result<Self> {
        let mut file = File::open(path).await?;
        if first > 0 {
            file.seek(SeekFrom::Start(first)).await?;
        }
        Ok(Self {
            file,
            total: length,
            remaining: length,
            chunk_size,
        })
    }

    /// Total number of bytes this stream will produce
    #[must_use]
    pub const fn total_len(&self) -> u64 {
        self.total
    }

    /// Bytes not yet produced
    #[must_use]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Read the next chunk, or `None` when the slice is exhausted
    pub async fn next_chunk(&mut self) -> io::Result<Option<Bytes>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let want = usize::try_from(self.remaining)
            .map_or(self.chunk_size, |rest| rest.min(self.chunk_size));
        let mut buf = vec![0u8; want];
        self.file.read_exact(&mut buf).await?;
        self.remaining -= want as u64;
        Ok(Some(Bytes::from(buf)))
    }
}
