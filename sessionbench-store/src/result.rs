//! Case Result

use serde::{Deserialize, Serialize};
use sessionbench_core::Sample;
use sessionbench_stats::{Stats, StatsError, compute_stats};

/// Everything one execution of one case produced, ready to persist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseResult {
    /// Stable case identifier
    pub key: String,
    /// Human-readable case name
    pub display_name: String,
    /// Execution context that produced the samples
    pub source_label: String,
    /// Timed iterations in execution order
    pub samples: Vec<Sample>,
    /// Statistics over `samples`
    pub stats: Stats,
}

impl CaseResult {
    /// Build a result from raw durations, computing its statistics.
    ///
    /// Fails with [`StatsError::EmptySamples`] when `durations` is empty.
    pub fn from_durations(
        key: impl Into<String>,
        display_name: impl Into<String>,
        source_label: impl Into<String>,
        durations: &[f64],
    ) -> Result<Self, StatsError> {
        let stats = compute_stats(durations)?;
        Ok(Self {
            key: key.into(),
            display_name: display_name.into(),
            source_label: source_label.into(),
            samples: Sample::from_durations(durations),
            stats,
        })
    }

    /// Number of timed iterations
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}
