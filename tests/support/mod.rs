#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use fileserv::config::{Config, ServeConfig};
use tempfile::TempDir;

pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// A temp dir holding a single 26-byte alphabet file
pub fn alphabet_file() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("alphabet.txt");
    fs::write(&path, ALPHABET).expect("write file");
    (dir, path)
}

/// Populate a directory tree: relative paths ending in `/` become empty
/// directories, everything else becomes a file with the given contents
pub fn write_tree(root: &Path, entries: &[(&str, &str)]) {
    for (rel, contents) in entries {
        if let Some(dir) = rel.strip_suffix('/') {
            fs::create_dir_all(root.join(dir)).expect("mkdir");
        } else {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("mkdir");
            }
            fs::write(&path, contents).expect("write file");
        }
    }
}

/// Default engine config; the chunking threshold is far above any fixture
/// so bodies stay buffered unless a test lowers it
pub fn test_config() -> Config {
    Config::default()
}

/// Config with the given chunking threshold/chunk size
pub fn chunked_config(threshold: u64, chunk_size: usize) -> Config {
    Config {
        serve: ServeConfig {
            file_chunking_threshold_size: threshold,
            file_chunking_chunk_size: chunk_size,
            ..ServeConfig::default()
        },
        ..Config::default()
    }
}

/// Config with the given range coalescing threshold
pub fn coalescing_config(threshold: u64) -> Config {
    Config {
        serve: ServeConfig {
            range_coalescing_threshold: threshold,
            ..ServeConfig::default()
        },
        ..Config::default()
    }
}
