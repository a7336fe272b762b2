//! Logger module
//!
//! Logging utilities for the serving engine: access lines for served
//! content and listings, warnings for rejected paths, and I/O error
//! reporting. Falls back to stdout/stderr until `init` is called.

pub mod writer;

use crate::config::Config;
use chrono::Local;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to access log
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Current timestamp for access lines
fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Log a served entity (full or partial content)
pub fn log_served(path: &Path, status: u16, bytes: u64) {
    write_access(&format!(
        "[{}] {} {} {bytes}B",
        timestamp(),
        status,
        path.display()
    ));
}

/// Log a rendered directory listing
pub fn log_listing(visible_path: &str, entries: usize) {
    write_access(&format!(
        "[{}] 200 {visible_path} ({entries} entries)",
        timestamp()
    ));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}
