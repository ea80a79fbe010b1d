#![warn(missing_docs)]
//! SessionBench Bridge - Shared Sessions Across Runtimes
//!
//! Lets several execution contexts log into one benchmark session:
//! - `SessionRegistry` hands out `BridgeHandle`s that share one store per session name
//! - A C ABI (`bench_open_session_c`, `bench_log_samples_c`, `bench_close_session_c`)
//!   for code that is not Rust
//!
//! Both sides persist through the same `SessionStore`, so their summary rows
//! interleave safely in one `summary.csv`.

mod error;
mod ffi;
mod registry;

pub use error::{
    BENCH_ERR_INVALID_ARGUMENT, BENCH_ERR_NULL_POINTER, BENCH_ERR_PANIC, BENCH_ERR_STORE,
    BENCH_OK, BridgeError,
};
pub use ffi::{BridgeSession, bench_close_session_c, bench_log_samples_c, bench_open_session_c};
pub use registry::{BridgeHandle, STORAGE_ROOT_ENV, SessionRegistry};
