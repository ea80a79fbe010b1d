#![warn(missing_docs)]
//! SessionBench Store - Session Persistence and History
//!
//! Writes benchmark results to disk and reads them back:
//! - `SessionStore`: one session directory, append-only summary plus per-case tables
//! - `SessionCatalog`: every session under a root, flattened into rows
//! - `HistoryModel`: a shared, reloadable snapshot of the catalog

pub mod csv;
mod catalog;
mod error;
mod history;
mod json;
pub mod layout;
mod result;
mod store;

pub use catalog::{
    CatalogState, SessionCatalog, SessionEntry, SummaryRow, parse_summary_rows, read_summary_rows,
};
pub use error::StoreError;
pub use history::HistoryModel;
pub use json::generate_json_history;
pub use layout::{BENCHMARKS_DIR, DEFAULT_STORAGE_ROOT, benchmarks_root, default_session_name};
pub use result::CaseResult;
pub use store::SessionStore;
