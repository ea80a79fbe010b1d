//! Store Errors

use sessionbench_stats::StatsError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing or reading session storage
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A finished temporary file could not replace its target
    #[error("failed to move finished file into place at {}: {source}", .path.display())]
    Persist {
        /// Path the operation was acting on
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Session name is empty after sanitizing
    #[error("invalid session name: {0:?}")]
    InvalidSessionName(String),

    /// Statistics could not be computed for a result
    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl StoreError {
    /// Build a closure that wraps an `io::Error` with the path it happened on
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
