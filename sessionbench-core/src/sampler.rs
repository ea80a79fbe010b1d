//! Sampler - Fixed-Count Iteration Protocol
//!
//! Every case is measured the same way:
//! - `warmup` untimed calls of the work unit (results discarded)
//! - `samples` timed calls, one duration per call
//!
//! Nothing is batched or averaged: one call is one sample. The work unit's own
//! state (captured accumulators, prebuilt collections) persists across calls;
//! the sampler never resets it.

use crate::measure::Timer;

/// Default number of untimed warmup calls
pub const DEFAULT_WARMUP_COUNT: usize = 3;

/// Default number of timed calls
pub const DEFAULT_SAMPLE_COUNT: usize = 10;

/// Runs a work unit through the warmup/measure protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    warmup: usize,
    samples: usize,
}

impl Sampler {
    /// Create a sampler with explicit warmup and sample counts
    pub fn new(warmup: usize, samples: usize) -> Self {
        Self { warmup, samples }
    }

    /// Number of untimed calls made before measurement
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Number of timed calls (and therefore durations returned by [`Sampler::run`])
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Run `work` `warmup` times, then `samples` times while timing each call.
    ///
    /// Returns exactly `samples` durations in nanoseconds, in execution order.
    /// A panic inside `work` unwinds out of this call; no partial sequence is
    /// returned.
    #[inline]
    pub fn run<T, F>(&self, mut work: F) -> Vec<f64>
    where
        F: FnMut() -> T,
    {
        for _ in 0..self.warmup {
            let _ = std::hint::black_box(work());
        }

        let mut durations = Vec::with_capacity(self.samples);
        for _ in 0..self.samples {
            let timer = Timer::start();
            let _ = std::hint::black_box(work());
            durations.push(timer.stop());
        }
        durations
    }

    /// Run with an untimed setup step before every timed call
    ///
    /// `setup` runs outside the timer on warmup and measured calls alike, so a
    /// case can rebuild its input (e.g. a fresh collection) per iteration.
    #[inline]
    pub fn run_with_setup<I, T, S, F>(&self, mut setup: S, mut routine: F) -> Vec<f64>
    where
        S: FnMut() -> I,
        F: FnMut(I) -> T,
    {
        for _ in 0..self.warmup {
            let input = setup();
            let _ = std::hint::black_box(routine(input));
        }

        let mut durations = Vec::with_capacity(self.samples);
        for _ in 0..self.samples {
            let input = setup();
            let timer = Timer::start();
            let _ = std::hint::black_box(routine(input));
            durations.push(timer.stop());
        }
        durations
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(DEFAULT_WARMUP_COUNT, DEFAULT_SAMPLE_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_sample_count_matches_config() {
        let sampler = Sampler::new(2, 7);
        let durations = sampler.run(|| 42_u64);
        assert_eq!(durations.len(), 7);
        assert!(durations.iter().all(|d| *d >= 0.0));
    }

    #[test]
    fn test_warmup_calls_are_not_sampled() {
        let calls = Cell::new(0usize);
        let sampler = Sampler::new(3, 5);
        let durations = sampler.run(|| calls.set(calls.get() + 1));

        assert_eq!(calls.get(), 8);
        assert_eq!(durations.len(), 5);
    }

    #[test]
    fn test_state_persists_across_iterations() {
        let mut acc = 0u64;
        let sampler = Sampler::new(1, 4);
        sampler.run(|| {
            acc += 1;
            acc
        });
        assert_eq!(acc, 5);
    }

    #[test]
    fn test_zero_samples() {
        let sampler = Sampler::new(0, 0);
        assert!(sampler.run(|| ()).is_empty());
    }

    #[test]
    fn test_run_with_setup() {
        let setups = Cell::new(0usize);
        let sampler = Sampler::new(1, 3);
        let durations = sampler.run_with_setup(
            || {
                setups.set(setups.get() + 1);
                vec![1u64; 64]
            },
            |v| v.iter().sum::<u64>(),
        );

        assert_eq!(durations.len(), 3);
        assert_eq!(setups.get(), 4);
    }

    #[test]
    fn test_panic_propagates() {
        let sampler = Sampler::new(0, 3);
        let mut n = 0;
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sampler.run(|| {
                n += 1;
                if n == 2 {
                    panic!("boom");
                }
            })
        }));
        assert!(result.is_err());
    }
}
