#![warn(missing_docs)]
//! SessionBench Core - Measurement Runtime
//!
//! This crate provides the execution side of a benchmark run:
//! - `Sampler` for the fixed warmup/measure iteration protocol
//! - Monotonic timing (`std::time::Instant`) with nanosecond resolution
//! - `Registry` of case descriptors, iterated in registration order
//! - CPU affinity pinning for the runner thread

mod measure;
mod registry;
mod sampler;

pub use measure::{Instant, Timer, pin_to_cpu};
pub use registry::{CaseDef, CaseFn, Registry};
pub use sampler::{DEFAULT_SAMPLE_COUNT, DEFAULT_WARMUP_COUNT, Sampler};

use serde::{Deserialize, Serialize};

/// One timed iteration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Position of the iteration within the measured sequence (warmup excluded)
    pub index: usize,
    /// Elapsed monotonic time in nanoseconds
    pub duration_nanos: f64,
}

impl Sample {
    /// Create a new sample
    #[inline]
    pub fn new(index: usize, duration_nanos: f64) -> Self {
        Self {
            index,
            duration_nanos,
        }
    }

    /// Number the durations in order, producing one sample per entry
    pub fn from_durations(durations: &[f64]) -> Vec<Sample> {
        durations
            .iter()
            .enumerate()
            .map(|(index, &d)| Sample::new(index, d))
            .collect()
    }
}
