//! Session Store - Append-Only Persistence for One Session
//!
//! A `SessionStore` owns one session directory. It is `Sync`: several
//! execution contexts may hold it behind an `Arc` and record results
//! concurrently.
//!
//! - Per-case tables are written to a temporary file in `cases/` and then
//!   persisted over the target, so a reader sees either the old table or the
//!   new one, never a partial write.
//! - Summary rows are appended under a per-store mutex, one `write_all` per
//!   row on an append-mode handle. The header goes out together with the
//!   first row when the file is empty.
//!
//! Locking is in-process only. Two stores opened independently on the same
//! session directory do not coordinate; share one instance instead (the
//! bridge registry does this by session name).

use crate::csv::{SUMMARY_HEADER, encode_case_table, encode_summary_row};
use crate::error::StoreError;
use crate::layout::{self, CASES_DIR, SUMMARY_FILE};
use crate::result::CaseResult;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;

/// Durable storage for one benchmark session
#[derive(Debug)]
pub struct SessionStore {
    session_id: String,
    session_dir: PathBuf,
    cases_dir: PathBuf,
    summary_path: PathBuf,
    summary_lock: Mutex<()>,
}

impl SessionStore {
    /// Open (creating if needed) a session under `root`, the sessions directory.
    ///
    /// Without a name, the session is named after the current UTC time.
    /// Names are sanitized into a single path component. Reopening an existing
    /// session by name is safe; nothing already written is touched.
    pub fn open(root: impl AsRef<Path>, session_name: Option<&str>) -> Result<Self, StoreError> {
        let session_id = match session_name {
            Some(name) => layout::sanitize_component(name.trim()),
            None => layout::default_session_name(),
        };
        if session_id.is_empty() {
            return Err(StoreError::InvalidSessionName(
                session_name.unwrap_or_default().to_string(),
            ));
        }

        let session_dir = root.as_ref().join(&session_id);
        let cases_dir = session_dir.join(CASES_DIR);
        let summary_path = session_dir.join(SUMMARY_FILE);

        fs::create_dir_all(&cases_dir).map_err(StoreError::io(&cases_dir))?;
        tracing::debug!(session = %session_id, dir = %session_dir.display(), "session opened");

        Ok(Self {
            session_id,
            session_dir,
            cases_dir,
            summary_path,
            summary_lock: Mutex::new(()),
        })
    }

    /// Session identifier (the directory name)
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Session directory
    pub fn session_dir(&self) -> &Path {
        &self.session_dir
    }

    /// Directory holding per-case sample tables
    pub fn cases_dir(&self) -> &Path {
        &self.cases_dir
    }

    /// Path of the cross-case summary table
    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }

    /// Path of the sample table for `key` from `source_label`
    pub fn case_path(&self, key: &str, source_label: &str) -> PathBuf {
        self.cases_dir
            .join(layout::case_file_name(key, source_label))
    }

    /// Write the result's samples as `cases/<key>_<source>.csv`, replacing any
    /// earlier table for the same key and source atomically.
    pub fn write_per_case(&self, result: &CaseResult) -> Result<PathBuf, StoreError> {
        let path = self.case_path(&result.key, &result.source_label);
        let table = encode_case_table(result);

        let mut tmp = NamedTempFile::new_in(&self.cases_dir).map_err(StoreError::io(&self.cases_dir))?;
        tmp.write_all(table.as_bytes())
            .and_then(|_| tmp.flush())
            .map_err(StoreError::io(tmp.path()))?;
        tmp.persist(&path).map_err(|e| StoreError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        Ok(path)
    }

    /// Append the result's row to `summary.csv`, writing the header first if
    /// the file is new.
    pub fn append_summary(&self, result: &CaseResult) -> Result<(), StoreError> {
        let row = encode_summary_row(result);

        let _guard = self
            .summary_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.summary_path)
            .map_err(StoreError::io(&self.summary_path))?;
        let len = file
            .metadata()
            .map_err(StoreError::io(&self.summary_path))?
            .len();

        let mut buf = String::with_capacity(SUMMARY_HEADER.len() + row.len());
        if len == 0 {
            buf.push_str(SUMMARY_HEADER);
        }
        buf.push_str(&row);

        file.write_all(buf.as_bytes())
            .map_err(StoreError::io(&self.summary_path))
    }

    /// Persist a result both ways: the per-case table, then the summary row.
    pub fn record(&self, result: &CaseResult) -> Result<(), StoreError> {
        self.write_per_case(result)?;
        self.append_summary(result)
    }
}
