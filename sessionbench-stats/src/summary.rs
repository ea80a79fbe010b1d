//! Summary Statistics
//!
//! Plain descriptive statistics over a case's samples:
//! - Mean and population standard deviation (variance divided by `n`)
//! - Median taken as the element at index `n / 2` of the ascending-sorted
//!   samples, i.e. the upper-middle element when `n` is even
//! - Minimum and maximum
//!
//! No outlier rejection is applied; every sample contributes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from statistics computation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// Statistics are undefined without at least one sample
    #[error("cannot compute statistics over an empty sample sequence")]
    EmptySamples,
}

/// Summary of one case's sample durations, all in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Arithmetic mean
    pub avg: f64,
    /// Upper-middle element of the sorted samples
    pub median: f64,
    /// Population standard deviation
    pub std: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
}

/// Compute summary statistics for a non-empty sequence of durations
pub fn compute_stats(samples: &[f64]) -> Result<Stats, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptySamples);
    }

    let n = samples.len() as f64;
    let avg = samples.iter().sum::<f64>() / n;

    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = sorted[sorted.len() / 2];
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    let variance = samples.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / n;

    // Float rounding in the sum can land the mean a hair outside the sample
    // range for near-constant inputs.
    let avg = if avg < min {
        min
    } else if avg > max {
        max
    } else {
        avg
    };

    Ok(Stats {
        avg,
        median,
        std: variance.sqrt(),
        min,
        max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_summary() {
        let stats = compute_stats(&[10.0, 20.0, 30.0]).unwrap();

        assert!((stats.avg - 20.0).abs() < f64::EPSILON);
        assert_eq!(stats.median, 20.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 30.0);
        // population std of {10, 20, 30} = sqrt(200/3)
        assert!((stats.std - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_even_length_picks_upper_middle() {
        let stats = compute_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn test_single_sample() {
        let stats = compute_stats(&[42.5]).unwrap();
        assert_eq!(stats.avg, 42.5);
        assert_eq!(stats.median, 42.5);
        assert_eq!(stats.std, 0.0);
        assert_eq!(stats.min, 42.5);
        assert_eq!(stats.max, 42.5);
    }

    #[test]
    fn test_empty_samples() {
        assert_eq!(compute_stats(&[]), Err(StatsError::EmptySamples));
    }

    #[test]
    fn test_population_not_sample_variance() {
        // {2, 4, 4, 4, 5, 5, 7, 9}: population std is exactly 2
        let stats = compute_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((stats.std - 2.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn ordering_holds_for_any_samples(xs in prop::collection::vec(0.0f64..1e12, 1..200)) {
            let s = compute_stats(&xs).unwrap();
            prop_assert!(s.min <= s.median && s.median <= s.max);
            prop_assert!(s.min <= s.avg && s.avg <= s.max);
            prop_assert!(s.std >= 0.0);
        }

        #[test]
        fn single_sample_is_identity(x in 0.0f64..1e12) {
            let s = compute_stats(&[x]).unwrap();
            prop_assert_eq!(s, Stats { avg: x, median: x, std: 0.0, min: x, max: x });
        }

        #[test]
        fn near_constant_samples_keep_avg_in_range(x in 1e-3f64..1e12, n in 1usize..500) {
            let s = compute_stats(&vec![x; n]).unwrap();
            prop_assert!(s.min <= s.avg && s.avg <= s.max);
        }
    }
}
