// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::collections::HashMap;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub serve: ServeConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Content serving configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServeConfig {
    /// Entities at or above this size are streamed in chunks
    #[serde(default = "default_chunking_threshold")]
    pub file_chunking_threshold_size: u64,
    /// Chunk size used when streaming
    #[serde(default = "default_chunk_size")]
    pub file_chunking_chunk_size: usize,
    /// Maximum gap (bytes) between requested ranges that still get merged
    #[serde(default)]
    pub range_coalescing_threshold: u64,
}

#[allow(clippy::missing_const_for_fn)]
fn default_chunking_threshold() -> u64 {
    262_144 // 256 KiB
}

#[allow(clippy::missing_const_for_fn)]
fn default_chunk_size() -> usize {
    65_536
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            file_chunking_threshold_size: default_chunking_threshold(),
            file_chunking_chunk_size: default_chunk_size(),
            range_coalescing_threshold: 0,
        }
    }
}

/// Directory listing configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ListingConfig {
    /// Append a footer line to rendered listing pages
    #[serde(default)]
    pub render_vanity_footer: bool,
}

/// Media type configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct MediaConfig {
    /// Extra extension -> media type mappings layered over the built-ins
    #[serde(default)]
    pub custom_types: HashMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log served requests, not just warnings and errors
    #[serde(default = "default_access_log")]
    pub access_log: bool,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            access_log: default_access_log(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}
