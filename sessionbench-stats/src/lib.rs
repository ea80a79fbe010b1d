#![warn(missing_docs)]
//! SessionBench Statistical Engine
//!
//! Reduces a case's sample durations to simple descriptive statistics:
//! mean, median, population standard deviation, minimum and maximum.
//! This crate deliberately stops at description; there is no outlier
//! rejection and no interval estimation.

mod summary;

pub use summary::{Stats, StatsError, compute_stats};

/// Truncate a nanosecond value to whole nanoseconds, toward zero.
///
/// This is the precision used everywhere results are written to disk.
#[inline]
pub fn truncate_nanos(value: f64) -> i64 {
    value as i64
}
