//! Directory listing module
//!
//! Merges one level of one or more directory roots into a single logical
//! namespace and renders it as an HTML index page. Listing is lazy: each
//! request reads exactly one directory level from each root, and nothing is
//! remembered between requests.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use tokio::fs;

use crate::config::Config;
use crate::logger;
use crate::serve::ServeError;

/// One entry of a merged directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    /// File size in bytes; `None` for directories
    pub size: Option<u64>,
    pub modified: DateTime<Local>,
}

/// A rendered listing plus the entries behind it
#[derive(Debug, Clone)]
pub struct Listing {
    pub html: String,
    pub entries: Vec<DirectoryEntry>,
}

/// Outcome of a listing request
#[derive(Debug)]
pub enum ListingOutcome {
    /// Target is a file or exists in no root; let the router try elsewhere
    NotHandled,
    Listed(Listing),
}

/// Stateless directory lister over an ordered set of roots
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    render_vanity_footer: bool,
}

impl DirectoryLister {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            render_vanity_footer: config.listing.render_vanity_footer,
        }
    }

    /// List `sub_path` merged across `roots` and render it as HTML
    ///
    /// `path_prefix` is whatever URI prefix the outer router has already
    /// consumed; every rendered link carries it, so the page works no
    /// matter where the listing is mounted.
    ///
    /// Entries are deduplicated by name with the first matching root
    /// winning, then sorted by name (case-sensitive, ASCII). Directories
    /// get a trailing `/`; below the top level a `../` parent link is
    /// rendered first.
    pub async fn list(
        &self,
        roots: &[PathBuf],
        sub_path: &str,
        path_prefix: &str,
    ) -> Result<ListingOutcome, ServeError> {
        let Some(clean) = clean_sub_path(sub_path) else {
            logger::log_warning(&format!("Listing path rejected: {sub_path}"));
            return Ok(ListingOutcome::NotHandled);
        };

        let Some(merged) = collect_entries(roots, &clean).await? else {
            return Ok(ListingOutcome::NotHandled);
        };

        let entries: Vec<DirectoryEntry> = merged.into_values().collect();
        let visible = visible_path(path_prefix, &clean);
        let html = render_listing(
            &visible,
            &entries,
            !clean.is_empty(),
            self.render_vanity_footer,
        );
        logger::log_listing(&visible, entries.len());
        Ok(ListingOutcome::Listed(Listing { html, entries }))
    }
}

/// Normalize a requested sub-path; `None` rejects it outright
///
/// Empty segments collapse; `.` and `..` segments are refused rather than
/// resolved, since a listing must never walk out of its roots.
fn clean_sub_path(sub_path: &str) -> Option<String> {
    let segments: Vec<&str> = sub_path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    if segments.iter().any(|s| *s == "." || *s == "..") {
        return None;
    }
    Some(segments.join("/"))
}

/// Merge one directory level across all roots
///
/// Returns `None` when no root resolves the sub-path to a directory (a
/// plain file there does not count). The `BTreeMap` both deduplicates by
/// name (first root wins) and yields the required ASCII name ordering.
async fn collect_entries(
    roots: &[PathBuf],
    sub_path: &str,
) -> Result<Option<BTreeMap<String, DirectoryEntry>>, ServeError> {
    let mut found_dir = false;
    let mut merged: BTreeMap<String, DirectoryEntry> = BTreeMap::new();

    for root in roots {
        let dir = if sub_path.is_empty() {
            root.clone()
        } else {
            root.join(sub_path)
        };

        match fs::metadata(&dir).await {
            Ok(m) if m.is_dir() => {}
            Ok(_) => continue,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(ServeError::io(&dir, e)),
        }
        found_dir = true;

        let mut reader = fs::read_dir(&dir).await.map_err(|e| ServeError::io(&dir, e))?;
        while let Some(dir_entry) = reader
            .next_entry()
            .await
            .map_err(|e| ServeError::io(&dir, e))?
        {
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if merged.contains_key(&name) {
                continue; // earlier root already provided this name
            }
            let meta = dir_entry
                .metadata()
                .await
                .map_err(|e| ServeError::io(&dir_entry.path(), e))?;
            let modified = meta
                .modified()
                .map_err(|e| ServeError::io(&dir_entry.path(), e))?;
            merged.insert(
                name.clone(),
                DirectoryEntry {
                    name,
                    is_dir: meta.is_dir(),
                    size: (!meta.is_dir()).then(|| meta.len()),
                    modified: DateTime::<Local>::from(modified),
                },
            );
        }
    }

    Ok(found_dir.then_some(merged))
}

/// Externally visible path for the listed directory, `/`-wrapped
fn visible_path(prefix: &str, sub_path: &str) -> String {
    let mut path = String::from("/");
    for segment in prefix
        .split('/')
        .chain(sub_path.split('/'))
        .filter(|s| !s.is_empty())
    {
        path.push_str(segment);
        path.push('/');
    }
    path
}

/// Parent of a `/`-wrapped visible path (`/a/b/` -> `/a/`)
fn parent_path(visible: &str) -> String {
    let trimmed = visible.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => trimmed[..=idx].to_string(),
        None => String::from("/"),
    }
}

/// Render the merged entries as an HTML index page
///
/// Pure over its inputs: the same entries and path always produce the same
/// bytes.
fn render_listing(
    visible: &str,
    entries: &[DirectoryEntry],
    show_parent: bool,
    vanity_footer: bool,
) -> String {
    let title = html_escape(&format!("Index of {visible}"));
    let name_width = entries
        .iter()
        .map(|e| display_name(e).chars().count())
        .max()
        .unwrap_or(0);

    let mut page = String::new();
    page.push_str("<html>\n<head><title>");
    page.push_str(&title);
    page.push_str("</title></head>\n<body>\n<h1>");
    page.push_str(&title);
    page.push_str("</h1>\n<hr>\n<pre>\n");

    if show_parent {
        page.push_str(&format!("<a href=\"{}\">../</a>\n", parent_path(visible)));
    }

    if entries.is_empty() {
        page.push_str("(no files)\n");
    }
    for entry in entries {
        let name = display_name(entry);
        let href = format!("{visible}{name}");
        let padding = " ".repeat(name_width - name.chars().count());
        let timestamp = entry.modified.format("%Y-%m-%d %H:%M:%S");
        page.push_str(&format!(
            "<a href=\"{}\">{}</a>{padding}    {timestamp}",
            html_escape(&href),
            html_escape(&name)
        ));
        if let Some(size) = entry.size {
            page.push_str(&format!("{:>14}", format_size(size)));
        }
        page.push('\n');
    }

    page.push_str("</pre>\n<hr>\n");
    if vanity_footer {
        page.push_str("<small>rendered by fileserv</small>\n<hr>\n");
    }
    page.push_str("</body>\n</html>\n");
    page
}

/// Entry name as rendered, with the trailing `/` for directories
fn display_name(entry: &DirectoryEntry) -> String {
    if entry.is_dir {
        format!("{}/", entry.name)
    } else {
        entry.name.clone()
    }
}

/// Human-readable size with a right-aligned unit suffix (e.g. `3  B`, `2 kB`)
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1000 && unit < UNITS.len() - 1 {
        value /= 1000;
        unit += 1;
    }
    format!("{}{:>3}", value, UNITS[unit])
}

/// Minimal HTML escaping for names and paths
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
