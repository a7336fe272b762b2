//! HTTP response building module
//!
//! Serializes serve plans into `hyper` responses: full bodies, single-range
//! partial content, multipart byte-ranges, conditional 304s, 416s, and HTML
//! listing pages. HEAD responses carry identical headers with an empty body.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::http::range::{RangePart, ResolvedRange};
use crate::logger;

/// Build 200 OK response with the full entity body
pub fn build_full_response(
    body: Bytes,
    content_type: &str,
    last_modified: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("Last-Modified", last_modified)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response for a single range
pub fn build_partial_response(
    body: Bytes,
    content_type: &str,
    last_modified: &str,
    range: ResolvedRange,
    total: u64,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { body };

    Response::builder()
        .status(206)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .header("Content-Range", range.content_range(total))
        .header("Accept-Ranges", "bytes")
        .header("Last-Modified", last_modified)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 206 Partial Content response carrying several ranges
///
/// The body is a `multipart/byteranges` document: one part per range, each
/// with its own `Content-Type` and `Content-Range` lines. No top-level
/// `Content-Range` header is set.
pub fn build_multipart_response(
    parts: &[RangePart],
    content_type: &str,
    last_modified: &str,
    total: u64,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let boundary = multipart_boundary(content_type, last_modified, total, parts);
    let body = multipart_body(&boundary, content_type, total, parts);
    let content_length = body.len();
    let body = if is_head { Bytes::new() } else { Bytes::from(body) };

    Response::builder()
        .status(206)
        .header(
            "Content-Type",
            format!("multipart/byteranges; boundary={boundary}"),
        )
        .header("Content-Length", content_length)
        .header("Accept-Ranges", "bytes")
        .header("Last-Modified", last_modified)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("206 multipart", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 304 Not Modified response
pub fn build_not_modified_response(last_modified: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(304)
        .header("Last-Modified", last_modified)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("304", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 416 Range Not Satisfiable response
pub fn build_416_response(entity_length: u64) -> Response<Full<Bytes>> {
    Response::builder()
        .status(416)
        .header("Content-Type", "text/plain")
        .header("Content-Range", format!("bytes */{entity_length}"))
        .body(Full::new(Bytes::from("Range Not Satisfiable")))
        .unwrap_or_else(|e| {
            log_build_error("416", &e);
            Response::new(Full::new(Bytes::from("Range Not Satisfiable")))
        })
}

/// Build 200 OK response for a rendered directory listing
pub fn build_listing_response(html: String, is_head: bool) -> Response<Full<Bytes>> {
    let content_length = html.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(html)
    };

    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("listing", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Derive the multipart boundary for a response
///
/// Hashed from the response inputs rather than generated randomly so that
/// identical requests produce byte-identical responses.
fn multipart_boundary(
    content_type: &str,
    last_modified: &str,
    total: u64,
    parts: &[RangePart],
) -> String {
    let mut hasher = DefaultHasher::new();
    content_type.hash(&mut hasher);
    last_modified.hash(&mut hasher);
    total.hash(&mut hasher);
    for part in parts {
        part.range.first.hash(&mut hasher);
        part.range.last.hash(&mut hasher);
    }
    format!("byterange-{:016x}", hasher.finish())
}

/// Assemble a multipart/byteranges body
fn multipart_body(boundary: &str, content_type: &str, total: u64, parts: &[RangePart]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Range: {}\r\n\r\n", part.range.content_range(total)).as_bytes(),
        );
        body.extend_from_slice(&part.body);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
