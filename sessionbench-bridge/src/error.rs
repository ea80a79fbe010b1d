//! Bridge Errors

use sessionbench_stats::StatsError;
use sessionbench_store::StoreError;
use thiserror::Error;

/// Status code for success
pub const BENCH_OK: i32 = 0;
/// A required pointer argument was null
pub const BENCH_ERR_NULL_POINTER: i32 = -1;
/// An argument was present but unusable (bad UTF-8, empty samples)
pub const BENCH_ERR_INVALID_ARGUMENT: i32 = -2;
/// The session store failed to persist the result
pub const BENCH_ERR_STORE: i32 = -3;
/// The call panicked; nothing was persisted
pub const BENCH_ERR_PANIC: i32 = -4;

/// Errors reported by the bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Persisting to the shared session failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An argument could not be used
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Parameter name
        name: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// A required pointer was null
    #[error("null pointer passed for `{0}`")]
    NullPointer(&'static str),

    /// Logging panicked; nothing was persisted
    #[error("panicked while logging `{0}`")]
    Panicked(String),
}

impl From<StatsError> for BridgeError {
    fn from(e: StatsError) -> Self {
        BridgeError::Store(StoreError::from(e))
    }
}

impl BridgeError {
    /// Status code returned across the C ABI
    pub fn code(&self) -> i32 {
        match self {
            BridgeError::Store(StoreError::Stats(_)) => BENCH_ERR_INVALID_ARGUMENT,
            BridgeError::Store(_) => BENCH_ERR_STORE,
            BridgeError::InvalidArgument { .. } => BENCH_ERR_INVALID_ARGUMENT,
            BridgeError::NullPointer(_) => BENCH_ERR_NULL_POINTER,
            BridgeError::Panicked(_) => BENCH_ERR_PANIC,
        }
    }
}
