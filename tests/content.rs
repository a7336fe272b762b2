mod support;

use http_body_util::BodyExt;
use hyper::body::Bytes;
use hyper::Method;
use support::*;

use fileserv::http::{cache, response};
use fileserv::{BodyPlan, ByteRange, ContentBody, ContentServer, ServeOutcome};

/// Pull a buffered body out of a plan, failing the test on a chunked one
fn buffered(body: &ContentBody) -> &Bytes {
    match body {
        ContentBody::Buffered(bytes) => bytes,
        ContentBody::Chunked(_) => panic!("expected buffered body"),
    }
}

/// Drain a chunked body and return (chunks, concatenated bytes)
async fn drain(body: ContentBody) -> (Vec<Bytes>, Vec<u8>) {
    let ContentBody::Chunked(mut stream) = body else {
        panic!("expected chunked body");
    };
    let mut chunks = Vec::new();
    let mut all = Vec::new();
    while let Some(chunk) = stream.next_chunk().await.expect("read chunk") {
        all.extend_from_slice(&chunk);
        chunks.push(chunk);
    }
    (chunks, all)
}

#[tokio::test]
async fn test_serves_full_content() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    let outcome = server.serve(&Method::GET, &path, None).await.unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };

    assert_eq!(plan.entity.length, 26);
    assert_eq!(plan.entity.media_type, "text/plain; charset=utf-8");
    let BodyPlan::Full(body) = &plan.body else {
        panic!("expected full body");
    };
    assert_eq!(buffered(body).as_ref(), ALPHABET);
}

#[tokio::test]
async fn test_single_range_plan_and_response() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    let ranges = [ByteRange::FromTo(0, 10)];
    let outcome = server
        .serve(&Method::GET, &path, Some(&ranges))
        .await
        .unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let BodyPlan::SingleRange { range, body } = &plan.body else {
        panic!("expected single range");
    };
    assert_eq!((range.first, range.last), (0, 10));
    assert_eq!(buffered(body).as_ref(), b"ABCDEFGHIJK");

    let resp = response::build_partial_response(
        buffered(body).clone(),
        &plan.entity.media_type,
        &plan.entity.http_date(),
        *range,
        plan.entity.length,
        false,
    );
    assert_eq!(resp.status(), 206);
    assert_eq!(resp.headers()["Content-Range"], "bytes 0-10/26");
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(bytes.as_ref(), b"ABCDEFGHIJK");
}

#[tokio::test]
async fn test_multi_range_parts_match_source_slices() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    let ranges = [ByteRange::FromTo(1, 10), ByteRange::Suffix(10)];
    let outcome = server
        .serve(&Method::GET, &path, Some(&ranges))
        .await
        .unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let BodyPlan::MultiRange { parts } = &plan.body else {
        panic!("expected multipart body");
    };

    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].body.as_ref(), b"BCDEFGHIJK");
    assert_eq!(parts[0].range.content_range(26), "bytes 1-10/26");
    assert_eq!(parts[1].body.as_ref(), b"QRSTUVWXYZ");
    assert_eq!(parts[1].range.content_range(26), "bytes 16-25/26");
}

#[tokio::test]
async fn test_multipart_response_is_deterministic() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());
    let ranges = [ByteRange::FromTo(1, 10), ByteRange::Suffix(10)];

    let mut bodies = Vec::new();
    let mut content_types = Vec::new();
    for _ in 0..2 {
        let outcome = server
            .serve(&Method::GET, &path, Some(&ranges))
            .await
            .unwrap();
        let ServeOutcome::Served(plan) = outcome else {
            panic!("expected Served");
        };
        let BodyPlan::MultiRange { parts } = &plan.body else {
            panic!("expected multipart body");
        };
        let resp = response::build_multipart_response(
            parts,
            &plan.entity.media_type,
            &plan.entity.http_date(),
            plan.entity.length,
            false,
        );
        content_types.push(resp.headers()["Content-Type"].clone());
        bodies.push(resp.into_body().collect().await.unwrap().to_bytes());
    }

    // Identical requests frame identically, boundary included
    assert_eq!(content_types[0], content_types[1]);
    assert_eq!(bodies[0], bodies[1]);
    let text = String::from_utf8(bodies[0].to_vec()).unwrap();
    assert!(text.contains("Content-Range: bytes 1-10/26"));
    assert!(text.contains("BCDEFGHIJK"));
    assert!(text.contains("QRSTUVWXYZ"));
}

#[tokio::test]
async fn test_nearby_ranges_coalesce() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&coalescing_config(5));

    // Gap of 5 bytes between the ranges merges at threshold 5
    let ranges = [ByteRange::FromTo(0, 4), ByteRange::FromTo(10, 19)];
    let outcome = server
        .serve(&Method::GET, &path, Some(&ranges))
        .await
        .unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let BodyPlan::SingleRange { range, body } = &plan.body else {
        panic!("expected coalesced single range");
    };
    assert_eq!((range.first, range.last), (0, 19));
    assert_eq!(buffered(body).as_ref(), b"ABCDEFGHIJKLMNOPQRST");
}

#[tokio::test]
async fn test_unsatisfiable_ranges() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    let ranges = [ByteRange::From(100)];
    let outcome = server
        .serve(&Method::GET, &path, Some(&ranges))
        .await
        .unwrap();
    let ServeOutcome::RangeNotSatisfiable { entity_length } = outcome else {
        panic!("expected RangeNotSatisfiable");
    };
    assert_eq!(entity_length, 26);

    let resp = response::build_416_response(entity_length);
    assert_eq!(resp.status(), 416);
    assert_eq!(resp.headers()["Content-Range"], "bytes */26");
}

#[tokio::test]
async fn test_non_get_is_not_handled() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    for method in [Method::POST, Method::PUT, Method::DELETE] {
        let outcome = server.serve(&method, &path, None).await.unwrap();
        assert!(matches!(outcome, ServeOutcome::NotHandled));
    }
}

#[tokio::test]
async fn test_head_is_planned_like_get() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    let outcome = server.serve(&Method::HEAD, &path, None).await.unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let resp = response::build_full_response(
        buffered(match &plan.body {
            BodyPlan::Full(body) => body,
            other => panic!("expected full body, got {other:?}"),
        })
        .clone(),
        &plan.entity.media_type,
        &plan.entity.http_date(),
        true,
    );
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["Content-Length"], "26");
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn test_missing_and_directory_targets_not_handled() {
    let (dir, _path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    let outcome = server
        .serve(&Method::GET, &dir.path().join("nope.txt"), None)
        .await
        .unwrap();
    assert!(matches!(outcome, ServeOutcome::NotHandled));

    let outcome = server.serve(&Method::GET, dir.path(), None).await.unwrap();
    assert!(matches!(outcome, ServeOutcome::NotHandled));
}

#[tokio::test]
async fn test_large_full_body_is_chunked() {
    let (_dir, path) = alphabet_file();
    // 26-byte file, threshold 8, chunks of 4
    let server = ContentServer::new(&chunked_config(8, 4));

    let outcome = server.serve(&Method::GET, &path, None).await.unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let BodyPlan::Full(body) = plan.body else {
        panic!("expected full body");
    };
    assert!(matches!(&body, ContentBody::Chunked(_)));
    assert_eq!(body.byte_len(), 26);

    let (chunks, all) = drain(body).await;
    assert_eq!(all, ALPHABET);
    // Fixed-size chunks with a short tail
    assert_eq!(chunks.len(), 7);
    assert!(chunks[..6].iter().all(|c| c.len() == 4));
    assert_eq!(chunks[6].len(), 2);
}

#[tokio::test]
async fn test_large_single_range_is_chunked() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&chunked_config(8, 4));

    let ranges = [ByteRange::FromTo(5, 20)];
    let outcome = server
        .serve(&Method::GET, &path, Some(&ranges))
        .await
        .unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let BodyPlan::SingleRange { range, body } = plan.body else {
        panic!("expected single range");
    };
    assert_eq!((range.first, range.last), (5, 20));

    let (_chunks, all) = drain(body).await;
    assert_eq!(all, b"FGHIJKLMNOPQRSTU");
}

#[tokio::test]
async fn test_small_range_of_large_entity_stays_buffered() {
    let (_dir, path) = alphabet_file();
    // Whole entity is above threshold but the requested slice is not
    let server = ContentServer::new(&chunked_config(20, 4));

    let ranges = [ByteRange::FromTo(0, 9)];
    let outcome = server
        .serve(&Method::GET, &path, Some(&ranges))
        .await
        .unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let BodyPlan::SingleRange { body, .. } = &plan.body else {
        panic!("expected single range");
    };
    assert_eq!(buffered(body).as_ref(), b"ABCDEFGHIJ");
}

#[tokio::test]
async fn test_repeated_requests_are_identical() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());
    let ranges = [ByteRange::Suffix(10)];

    let mut snapshots = Vec::new();
    for _ in 0..3 {
        let outcome = server
            .serve(&Method::GET, &path, Some(&ranges))
            .await
            .unwrap();
        let ServeOutcome::Served(plan) = outcome else {
            panic!("expected Served");
        };
        let BodyPlan::SingleRange { range, body } = &plan.body else {
            panic!("expected single range");
        };
        snapshots.push((plan.entity.clone(), *range, buffered(body).clone()));
    }
    assert_eq!(snapshots[0], snapshots[1]);
    assert_eq!(snapshots[1], snapshots[2]);
}

#[tokio::test]
async fn test_serve_under_blocks_traversal() {
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("secret.txt"), "secret").unwrap();
    let root = outside.path().join("public");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("ok.txt"), "ok").unwrap();

    let server = ContentServer::new(&test_config());

    let outcome = server
        .serve_under(&Method::GET, &root, "ok.txt", None)
        .await
        .unwrap();
    assert!(matches!(outcome, ServeOutcome::Served(_)));

    let outcome = server
        .serve_under(&Method::GET, &root, "../secret.txt", None)
        .await
        .unwrap();
    assert!(matches!(outcome, ServeOutcome::NotHandled));
}

#[tokio::test]
async fn test_in_memory_resource_serving() {
    use chrono::{TimeZone, Utc};

    let server = ContentServer::new(&test_config());
    let bytes = Bytes::from_static(ALPHABET);
    let modified = Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 45).unwrap();

    let outcome = server.serve_resource(&Method::GET, "assets/alphabet.txt", &bytes, modified);
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    assert_eq!(plan.entity.media_type, "text/plain; charset=utf-8");
    assert_eq!(plan.entity.length, 26);

    let ranges = [ByteRange::FromTo(1, 10), ByteRange::Suffix(10)];
    let outcome = server.serve_resource_ranges(
        &Method::GET,
        "assets/alphabet.txt",
        &bytes,
        modified,
        Some(&ranges),
    );
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };
    let BodyPlan::MultiRange { parts } = &plan.body else {
        panic!("expected multipart body");
    };
    assert_eq!(parts[0].body.as_ref(), b"BCDEFGHIJK");
    assert_eq!(parts[1].body.as_ref(), b"QRSTUVWXYZ");

    let outcome =
        server.serve_resource(&Method::POST, "assets/alphabet.txt", &bytes, modified);
    assert!(matches!(outcome, ServeOutcome::NotHandled));
}

#[tokio::test]
async fn test_if_modified_since_round_trip() {
    let (_dir, path) = alphabet_file();
    let server = ContentServer::new(&test_config());

    let outcome = server.serve(&Method::GET, &path, None).await.unwrap();
    let ServeOutcome::Served(plan) = outcome else {
        panic!("expected Served");
    };

    // Client replays the Last-Modified it was given: entity is fresh
    let last_modified = plan.entity.http_date();
    assert!(cache::not_modified(Some(&last_modified), plan.entity.modified));
    let resp = response::build_not_modified_response(&last_modified);
    assert_eq!(resp.status(), 304);

    // A client snapshot from before the file existed is stale
    assert!(!cache::not_modified(
        Some("Mon, 01 Jan 1990 00:00:00 GMT"),
        plan.entity.modified
    ));
}
