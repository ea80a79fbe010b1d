//! On-Disk Layout
//!
//! ```text
//! <root>/Benchmarks/
//!   <session_id>/
//!     summary.csv
//!     cases/
//!       <key>_<source_label>.csv
//! ```
//!
//! Session ids default to the UTC start time, `2025-10-08T12-34-56Z`: an
//! ISO-8601 timestamp with the colons replaced so it is a legal path
//! component everywhere.

use chrono::{DateTime, NaiveDateTime, Utc};
use sanitize_filename::{Options, sanitize_with_options};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Storage root used when nothing else is configured
pub const DEFAULT_STORAGE_ROOT: &str = "target/sessionbench";

/// Directory under the storage root that holds one sub-directory per session
pub const BENCHMARKS_DIR: &str = "Benchmarks";

/// Cross-case summary table inside a session directory
pub const SUMMARY_FILE: &str = "summary.csv";

/// Per-case sample tables inside a session directory
pub const CASES_DIR: &str = "cases";

const SESSION_NAME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const PATH_SAFE_SESSION_FORMAT: &str = "%Y-%m-%dT%H-%M-%SZ";

/// Resolve the sessions directory under a storage root
pub fn benchmarks_root(storage_root: impl AsRef<Path>) -> PathBuf {
    storage_root.as_ref().join(BENCHMARKS_DIR)
}

/// Make a string safe to use as a single path component.
///
/// Path separators, `:` and other characters illegal on common filesystems
/// are replaced with `-`.
pub fn sanitize_component(raw: &str) -> String {
    sanitize_with_options(
        raw,
        Options {
            windows: true,
            truncate: true,
            replacement: "-",
        },
    )
}

/// Session name for a run starting at `at`
pub fn session_name_at(at: DateTime<Utc>) -> String {
    sanitize_component(&at.format(SESSION_NAME_FORMAT).to_string())
}

/// Session name for a run starting now
pub fn default_session_name() -> String {
    session_name_at(Utc::now())
}

/// File name of a case's sample table.
///
/// Plain names map to `<key>_<source>.csv`. Anything else is percent-escaped,
/// and `_` is escaped in the source label, so the last `_` always separates
/// the two parts and distinct pairs never share a file.
pub fn case_file_name(key: &str, source_label: &str) -> String {
    format!(
        "{}_{}.csv",
        escape_component(key, true),
        escape_component(source_label, false)
    )
}

fn escape_component(raw: &str, keep_underscore: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '-' || c == '.' || (keep_underscore && c == '_') {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    out
}

/// Interpret a session id as a timestamp.
///
/// Accepts RFC 3339 and the path-safe form produced by [`session_name_at`].
pub fn parse_session_date(session_id: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(session_id) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(session_id, PATH_SAFE_SESSION_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Creation time of a file or directory.
///
/// Falls back to the modification time where the filesystem does not record
/// creation, and to the Unix epoch when metadata is unavailable.
pub fn created_at(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .and_then(|meta| meta.created().or_else(|_| meta.modified()))
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| DateTime::<Utc>::from(UNIX_EPOCH))
}
