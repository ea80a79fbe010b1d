//! Case Executor
//!
//! Runs suites and renders what they produced.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Registry (suite of CaseDefs)
//!       │
//!       ▼
//! ┌─────────────┐
//! │   planner   │  Regex filter on case keys
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  execution  │  Sample, compute stats, record
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Run lines, history tables
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Sequential runner, recorders and the background run thread
//! - [`formatting`] - Human, CSV and JSON output

mod execution;
mod formatting;

// Re-export public API
pub use execution::{
    CaseOutcome, CaseStatus, Recorder, RunConfig, RunOutcome, Runner, spawn_run,
};
pub use formatting::{
    filter_history, format_case_line, format_history_csv, format_history_human,
    format_history_json, format_run_output, short_session,
};
