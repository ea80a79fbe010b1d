//! Built-in Suites
//!
//! Two suites over the same case keys so their results line up per key in
//! one session:
//! - [`native`]: standard-library containers, recorded straight into the store
//! - [`bridged`]: alternative containers, recorded through the C ABI from a
//!   separate thread

pub mod bridged;
pub mod native;

/// Problem sizes shared by both suites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Workload {
    /// Elements appended per iteration
    pub appends: usize,
    /// Elements inserted at the front per iteration
    pub front_inserts: usize,
    /// Lookups per iteration
    pub lookups: usize,
    /// Entries in lookup tables
    pub table_size: usize,
    /// Elements summed per iteration
    pub iterations: usize,
    /// Closure calls per iteration
    pub calls: usize,
    /// Heap allocations per iteration
    pub allocations: usize,
    /// String parts per iteration
    pub parts: usize,
}

impl Default for Workload {
    fn default() -> Self {
        Self {
            appends: 100_000,
            front_inserts: 10_000,
            lookups: 2_000_000,
            table_size: 100_000,
            iterations: 1_000_000,
            calls: 5_000_000,
            allocations: 500_000,
            parts: 20_000,
        }
    }
}

impl Workload {
    /// Tiny sizes for smoke runs and tests
    pub fn quick() -> Self {
        Self {
            appends: 64,
            front_inserts: 32,
            lookups: 128,
            table_size: 32,
            iterations: 64,
            calls: 64,
            allocations: 32,
            parts: 16,
        }
    }
}

/// Keys every built-in suite registers, in execution order
pub const CASE_KEYS: [&str; 11] = [
    "vec_push_reserve",
    "vec_push_no_reserve",
    "vec_insert_at_zero",
    "hashmap_lookup_hit",
    "hashset_contains",
    "for_loop_vs_for_each",
    "closure-non-captured",
    "closure-captured",
    "box_allocation_overhead",
    "string_concatenation",
    "string_reserve_append",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suites_share_keys() {
        let native = native::suite(Workload::quick());
        let bridged = bridged::suite(Workload::quick());

        let native_keys: Vec<_> = native.iter().map(|c| c.key()).collect();
        let bridged_keys: Vec<_> = bridged.iter().map(|c| c.key()).collect();
        assert_eq!(native_keys, CASE_KEYS);
        assert_eq!(bridged_keys, CASE_KEYS);
    }

    #[test]
    fn test_display_names_differ() {
        let native = native::suite(Workload::quick());
        let bridged = bridged::suite(Workload::quick());
        for key in CASE_KEYS {
            assert_ne!(
                native.get(key).unwrap().display_name(),
                bridged.get(key).unwrap().display_name()
            );
        }
    }
}
