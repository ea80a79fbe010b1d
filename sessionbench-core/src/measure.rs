//! Monotonic Timing
//!
//! All durations come from `std::time::Instant`, which is monotonic on every
//! supported platform. Wall-clock time (`SystemTime`) is never used for
//! measurement, so NTP or manual clock adjustments cannot skew a sample.

use std::time::Duration;

// ─── Instant ─────────────────────────────────────────────────────────────────

/// Monotonic instant for benchmarking
#[derive(Debug, Clone, Copy)]
pub struct Instant {
    instant: std::time::Instant,
}

impl Instant {
    /// Capture current instant
    #[inline(always)]
    pub fn now() -> Self {
        Self {
            instant: std::time::Instant::now(),
        }
    }

    /// Compute elapsed time since this instant
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.instant.elapsed()
    }
}

// ─── Timer ───────────────────────────────────────────────────────────────────

/// Timer for measuring a single iteration
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Stop the timer and return elapsed nanoseconds
    #[inline(always)]
    pub fn stop(&self) -> f64 {
        self.start.elapsed().as_nanos() as f64
    }
}

/// Set CPU affinity to pin the current thread to a specific core
///
/// Keeps the runner thread from migrating between cores mid-case.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<(), std::io::Error> {
    use std::mem::MaybeUninit;

    unsafe {
        let mut set = MaybeUninit::<libc::cpu_set_t>::zeroed();
        let set_ref = set.assume_init_mut();

        libc::CPU_ZERO(set_ref);
        libc::CPU_SET(cpu, set_ref);

        let result = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), set_ref);

        if result == 0 {
            Ok(())
        } else {
            Err(std::io::Error::last_os_error())
        }
    }
}

/// CPU pinning is a no-op on this platform
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(_cpu: usize) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instant_elapsed() {
        let start = Instant::now();
        std::thread::sleep(Duration::from_millis(10));
        let elapsed = start.elapsed();

        assert!(elapsed >= Duration::from_millis(5));
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_timer_nanos() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        let nanos = timer.stop();

        assert!(nanos >= 5_000_000.0);
    }

    #[test]
    fn test_timer_is_monotonic() {
        let timer = Timer::start();
        let a = timer.stop();
        let b = timer.stop();
        assert!(b >= a);
    }
}
