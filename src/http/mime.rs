//! MIME type resolution module
//!
//! Maps filename extensions to media types. Matching is case-insensitive and
//! the built-in table can be extended with custom mappings per resolver.

use std::collections::HashMap;
use std::path::Path;

/// The fallback media type for unknown or missing extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extension-based media type resolver
///
/// Resolution is a pure lookup: custom mappings first, then the built-in
/// table, then `application/octet-stream`. Never fails.
///
/// # Examples
/// ```
/// use fileserv::http::mime::MediaTypeResolver;
///
/// let resolver = MediaTypeResolver::new();
/// assert_eq!(resolver.resolve("index.html"), "text/html; charset=utf-8");
/// assert_eq!(resolver.resolve("movie.MP4"), "video/mp4");
/// assert_eq!(resolver.resolve("unknown.xyz"), "application/octet-stream");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MediaTypeResolver {
    /// Custom extension mappings, keyed by lowercase extension
    custom: HashMap<String, String>,
}

impl MediaTypeResolver {
    /// Create a resolver with only the built-in table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver with custom mappings layered over the built-in table
    #[must_use]
    pub fn with_types<I, K, V>(types: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let custom = types
            .into_iter()
            .map(|(ext, media_type)| (ext.into().to_ascii_lowercase(), media_type.into()))
            .collect();
        Self { custom }
    }

    /// Register an additional extension mapping
    pub fn register(&mut self, extension: &str, media_type: &str) {
        self.custom
            .insert(extension.to_ascii_lowercase(), media_type.to_string());
    }

    /// Resolve a filename to its media type
    #[must_use]
    pub fn resolve(&self, filename: &str) -> &str {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        if let Some(ext) = &extension {
            if let Some(media_type) = self.custom.get(ext) {
                return media_type;
            }
        }
        builtin_content_type(extension.as_deref())
    }
}

/// Get the built-in media type for a lowercase file extension
#[must_use]
pub fn builtin_content_type(extension: Option<&str>) -> &'static str {
    match extension {
        // Text
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("txt" | "md") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",

        // JavaScript/WASM
        Some("js" | "mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Video
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg" | "ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",

        // Audio
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("m4a") => "audio/mp4",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        // Documents
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("gz" | "gzip") => "application/gzip",
        Some("tar") => "application/x-tar",

        // Default
        _ => OCTET_STREAM,
    }
}
