//! Session Catalog - Reading History Back
//!
//! Scans every session directory under the sessions root and rebuilds a flat
//! list of summary rows. Loading is best-effort: a missing root yields an
//! empty catalog and a session whose `summary.csv` cannot be read contributes
//! nothing, without stopping the scan.

use crate::csv::{SUMMARY_FIELD_COUNT, split_csv_line, unquote};
use crate::error::StoreError;
use crate::layout::{self, SUMMARY_FILE};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sessionbench_stats::truncate_nanos;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const HEADER_MARKER: &str = "key,name,language";

/// One summary row, tagged with the session it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Session directory name
    pub session_id: String,
    /// Session id parsed as a date, or the directory creation time
    pub session_date: DateTime<Utc>,
    /// Case key
    pub key: String,
    /// Case display name
    pub display_name: String,
    /// Source label
    pub source_label: String,
    /// Mean, whole nanoseconds
    pub avg_ns: i64,
    /// Median, whole nanoseconds
    pub median_ns: i64,
    /// Population standard deviation, whole nanoseconds
    pub std_ns: i64,
    /// Fastest sample, whole nanoseconds
    pub min_ns: i64,
    /// Slowest sample, whole nanoseconds
    pub max_ns: i64,
    /// Number of samples recorded
    pub sample_count: i64,
}

impl SummaryRow {
    /// Identity of the row: `session_id|key|source_label`
    pub fn id(&self) -> String {
        format!("{}|{}|{}", self.session_id, self.key, self.source_label)
    }
}

/// Everything the catalog knows, rebuilt wholesale on each load
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogState {
    /// Rows from all sessions, most recent session first
    pub rows: Vec<SummaryRow>,
    /// Session ids, most recent first
    pub session_ids: Vec<String>,
    /// First entry of `session_ids`
    pub latest_session_id: Option<String>,
}

impl CatalogState {
    /// True when no session was found
    pub fn is_empty(&self) -> bool {
        self.session_ids.is_empty()
    }

    /// Rows for one case key, in catalog order
    pub fn rows_for_key<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a SummaryRow> + 'a {
        self.rows.iter().filter(move |row| row.key == key)
    }
}

/// A session directory found on disk
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Directory name
    pub id: String,
    /// Full path of the directory
    pub path: PathBuf,
    /// Creation time, falling back to modification time
    pub created_at: DateTime<Utc>,
}

/// Reader over all sessions under one root
#[derive(Debug, Clone)]
pub struct SessionCatalog {
    root: PathBuf,
}

impl SessionCatalog {
    /// Catalog over `root`, the directory holding one sub-directory per session
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Sessions root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List session directories, most recently created first.
    ///
    /// Ties on creation time are broken by session id, descending. Hidden
    /// entries and plain files are ignored.
    pub fn sessions(&self) -> io::Result<Vec<SessionEntry>> {
        let mut sessions = Vec::new();
        let entries = fs::read_dir(&self.root)?.filter_map(|entry| readable_entry(&self.root, entry));
        for entry in entries {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().into_owned();
            if id.starts_with('.') {
                continue;
            }
            let path = entry.path();
            let created_at = layout::created_at(&path);
            sessions.push(SessionEntry { id, path, created_at });
        }

        sessions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(sessions)
    }

    /// Rebuild the catalog from disk.
    ///
    /// Never fails: problems are logged and the affected data left out.
    pub fn load_all(&self) -> CatalogState {
        let sessions = match self.sessions() {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::debug!(root = %self.root.display(), error = %e, "no sessions to load");
                return CatalogState::default();
            }
        };

        // Parse sessions in parallel; collect keeps the sorted order.
        let per_session: Vec<Vec<SummaryRow>> = sessions
            .par_iter()
            .map(|session| {
                let fallback = layout::parse_session_date(&session.id).unwrap_or(session.created_at);
                match read_summary_rows(&session.path.join(SUMMARY_FILE), &session.id, fallback) {
                    Ok(rows) => rows,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
                    Err(e) => {
                        tracing::warn!(session = %session.id, error = %e, "skipping unreadable summary");
                        Vec::new()
                    }
                }
            })
            .collect();

        let session_ids: Vec<String> = sessions.into_iter().map(|s| s.id).collect();
        let rows: Vec<SummaryRow> = per_session.into_iter().flatten().collect();
        tracing::debug!(
            sessions = session_ids.len(),
            rows = rows.len(),
            "catalog loaded"
        );

        CatalogState {
            latest_session_id: session_ids.first().cloned(),
            session_ids,
            rows,
        }
    }

    /// Remove every session, then return the (empty) reloaded state.
    ///
    /// A root that does not exist is not an error.
    pub fn delete_all(&self) -> Result<CatalogState, StoreError> {
        match fs::remove_dir_all(&self.root) {
            Ok(()) => {
                tracing::info!(root = %self.root.display(), "history deleted");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(StoreError::Io {
                    path: self.root.clone(),
                    source: e,
                });
            }
        }
        Ok(self.load_all())
    }
}

/// Read and parse one session's `summary.csv`
pub fn read_summary_rows(
    path: &Path,
    session_id: &str,
    session_date: DateTime<Utc>,
) -> io::Result<Vec<SummaryRow>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_summary_rows(&text, session_id, session_date))
}

/// Parse the text of a `summary.csv`.
///
/// The header is skipped when present. Blank lines and rows with too few
/// fields are dropped; numbers that do not parse read as 0.
pub fn parse_summary_rows(
    text: &str,
    session_id: &str,
    session_date: DateTime<Utc>,
) -> Vec<SummaryRow> {
    let mut lines = text.lines().peekable();
    if lines
        .peek()
        .is_some_and(|first| first.to_lowercase().contains(HEADER_MARKER))
    {
        lines.next();
    }

    lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields = split_csv_line(line);
            if fields.len() < SUMMARY_FIELD_COUNT {
                tracing::debug!(session = session_id, line, "skipping short summary row");
                return None;
            }
            Some(SummaryRow {
                session_id: session_id.to_string(),
                session_date,
                key: unquote(fields[0]).into_owned(),
                display_name: unquote(fields[1]).into_owned(),
                source_label: unquote(fields[2]).into_owned(),
                avg_ns: parse_nanos(fields[3]),
                median_ns: parse_nanos(fields[4]),
                std_ns: parse_nanos(fields[5]),
                min_ns: parse_nanos(fields[6]),
                max_ns: parse_nanos(fields[7]),
                sample_count: parse_count(fields[9]),
            })
        })
        .collect()
}

/// One unreadable directory entry is skipped, not fatal for the listing
fn readable_entry<T>(root: &Path, entry: io::Result<T>) -> Option<T> {
    match entry {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::debug!(root = %root.display(), error = %e, "skipping unreadable entry");
            None
        }
    }
}

/// Whole nanoseconds from an integer or fractional field; 0 when the field
/// is not a finite number
fn parse_nanos(field: &str) -> i64 {
    unquote(field)
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map_or(0, truncate_nanos)
}

fn parse_count(field: &str) -> i64 {
    let field = unquote(field);
    field.trim().parse::<i64>().unwrap_or_else(|_| parse_nanos(&field))
}
