#![warn(missing_docs)]
//! # SessionBench
//!
//! Micro-benchmark harness that keeps its history as plain CSV, one folder
//! per session.
//!
//! - **Fixed protocol**: untimed warmup iterations, then a fixed number of
//!   timed samples per case
//! - **Summary statistics**: average, standard deviation, median, min, max
//! - **Session store**: append-only `summary.csv` plus one CSV per case
//! - **Cross-runtime sessions**: other runtimes log into the same session
//!   through a C ABI (`bench_open_session_c` / `bench_log_samples_c`)
//! - **History**: every session's summary rows, grouped and compared by case key
//!
//! ## Quick Start
//!
//! ```ignore
//! use sessionbench::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut suite = Registry::new();
//!     suite.case("sum", "Sum 1..1000", |s| s.run(|| (1..=1000u64).sum::<u64>()));
//!
//!     let run = run_session(&BenchConfig::default(), suite, None, &RunOptions::default())?;
//!     print!("{}", format_run_output(&run.native));
//!     Ok(())
//! }
//! ```
//!
//! ## Logging from another runtime
//!
//! ```c
//! #include "sessionbench.h"
//!
//! BridgeSession *s = bench_open_session_c("2025-10-08T12:34:56Z");
//! double samples[] = {10.0, 20.0, 30.0};
//! bench_log_samples_c(s, "array_append", "Vec push", "C", samples, 3);
//! bench_close_session_c(s);
//! ```

// Re-export core types
pub use sessionbench_core::{
    CaseDef, CaseFn, DEFAULT_SAMPLE_COUNT, DEFAULT_WARMUP_COUNT, Registry, Sample, Sampler,
    pin_to_cpu,
};

// Re-export stats
pub use sessionbench_stats::{Stats, StatsError, compute_stats, truncate_nanos};

// Re-export storage
pub use sessionbench_store::{
    CaseResult, CatalogState, HistoryModel, SessionCatalog, SessionStore, StoreError, SummaryRow,
    generate_json_history,
};

// Re-export the bridge
pub use sessionbench_bridge::{
    BridgeError, BridgeHandle, SessionRegistry, bench_close_session_c, bench_log_samples_c,
    bench_open_session_c,
};

// Re-export the runner
pub use sessionbench_cli::{
    BenchConfig, RunOptions, RunOutcome, SessionRun, format_history_human, format_run_output,
    run_session,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BenchConfig, CaseDef, Registry, RunOptions, Sampler, format_run_output, run_session,
    };
}

/// Run the SessionBench CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() {
///     sessionbench::run().unwrap();
/// }
/// ```
pub use sessionbench_cli::run;
