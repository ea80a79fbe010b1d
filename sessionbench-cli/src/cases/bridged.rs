//! Bridged Suite
//!
//! The same case keys as the native suite, measured with alternative
//! containers (`VecDeque`, `BTreeMap`, `BTreeSet`, `Rc`, `fmt::Write`) and
//! recorded through the C ABI. The suite runs on its own thread and attaches
//! to the session by name, the way a foreign runtime would.

use super::Workload;
use crate::config::BenchConfig;
use crate::executor::{RunConfig, RunOutcome, Recorder, Runner};
use crate::planner::build_plan;
use anyhow::{Context, bail};
use regex::Regex;
use sessionbench_bridge::{
    BENCH_OK, BridgeSession, bench_close_session_c, bench_log_samples_c, bench_open_session_c,
};
use sessionbench_core::{Registry, Sampler};
use sessionbench_store::CaseResult;
use sessionbench_store::layout::sanitize_component;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::ffi::CString;
use std::fmt::Write;
use std::hint::black_box;
use std::io;
use std::ptr::NonNull;
use std::rc::Rc;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Build the bridged suite
pub fn suite(w: Workload) -> Registry {
    let mut registry = Registry::new();

    registry.case(
        "vec_push_reserve",
        format!("VecDeque::push_back with reserve ({})", w.appends),
        move |s| {
            s.run(|| {
                let mut q: VecDeque<usize> = VecDeque::with_capacity(w.appends);
                for i in 0..w.appends {
                    q.push_back(i);
                }
                q
            })
        },
    );

    registry.case(
        "vec_push_no_reserve",
        format!("VecDeque::push_back without reserve ({})", w.appends),
        move |s| {
            s.run(|| {
                let mut q: VecDeque<usize> = VecDeque::new();
                for i in 0..w.appends {
                    q.push_back(i);
                }
                q
            })
        },
    );

    registry.case(
        "vec_insert_at_zero",
        format!("VecDeque::push_front ({})", w.front_inserts),
        move |s| {
            s.run(|| {
                let mut q: VecDeque<usize> = VecDeque::new();
                for i in 0..w.front_inserts {
                    q.push_front(i);
                }
                q
            })
        },
    );

    registry.case(
        "hashmap_lookup_hit",
        format!("BTreeMap lookup hit (size={}, ops={})", w.table_size, w.lookups),
        move |s| {
            let table: BTreeMap<usize, usize> = (0..w.table_size).map(|i| (i, i)).collect();
            s.run(|| {
                let mut sum = 0usize;
                for i in 0..w.lookups {
                    sum = sum.wrapping_add(table.get(&(i % w.table_size)).copied().unwrap_or(0));
                }
                sum
            })
        },
    );

    registry.case(
        "hashset_contains",
        format!("BTreeSet::contains (size={}, ops={})", w.table_size, w.lookups),
        move |s| {
            let set: BTreeSet<usize> = (0..w.table_size).collect();
            s.run(|| {
                let mut hits = 0usize;
                for i in 0..w.lookups {
                    if set.contains(&(i % w.table_size)) {
                        hits += 1;
                    }
                }
                hits
            })
        },
    );

    registry.case(
        "for_loop_vs_for_each",
        format!("index loop + fold ({})", w.iterations),
        move |s| {
            let values: Vec<usize> = (0..w.iterations).collect();
            s.run(|| {
                let mut index_sum = 0usize;
                let mut i = 0;
                while i < values.len() {
                    index_sum = index_sum.wrapping_add(values[i]);
                    i += 1;
                }
                let fold_sum = values.iter().fold(0usize, |acc, v| acc.wrapping_add(*v));
                (index_sum, fold_sum)
            })
        },
    );

    registry.case(
        "closure-non-captured",
        format!("fn pointer call (calls={})", w.calls),
        move |s| {
            fn one() -> usize {
                1
            }
            let f: fn() -> usize = one;
            s.run(|| {
                let mut acc = 0usize;
                for _ in 0..w.calls {
                    acc = acc.wrapping_add(black_box(f)());
                }
                acc
            })
        },
    );

    registry.case(
        "closure-captured",
        format!("boxed dyn Fn call, capturing (calls={})", w.calls),
        move |s| {
            let value = black_box(1usize);
            let capturing: Box<dyn Fn() -> usize> = Box::new(move || value);
            s.run(|| {
                let mut acc = 0usize;
                for _ in 0..w.calls {
                    acc = acc.wrapping_add(black_box(&capturing)());
                }
                acc
            })
        },
    );

    registry.case(
        "box_allocation_overhead",
        format!("Rc allocation overhead ({} values)", w.allocations),
        move |s| {
            s.run(|| {
                let mut sum = 0usize;
                for i in 0..w.allocations {
                    let shared = black_box(Rc::new(i));
                    sum = sum.wrapping_add(*shared);
                }
                sum
            })
        },
    );

    registry.case(
        "string_concatenation",
        format!("fmt::Write concatenation ({} parts)", w.parts),
        move |s| {
            s.run(|| {
                let mut out = String::new();
                for i in 0..w.parts {
                    let _ = write!(out, "{i}");
                }
                out
            })
        },
    );

    registry.case(
        "string_reserve_append",
        format!("fmt::Write with reserve ({} parts)", w.parts),
        move |s| {
            s.run(|| {
                let mut out = String::with_capacity(w.parts * 2);
                for i in 0..w.parts {
                    let _ = write!(out, "{i}");
                }
                out
            })
        },
    );

    registry
}

/// Records results by calling the C entry points
#[derive(Debug)]
pub struct FfiRecorder {
    session: NonNull<BridgeSession>,
    session_id: String,
}

impl FfiRecorder {
    /// Attach to the session called `name` through `bench_open_session_c`
    pub fn open(name: &str) -> anyhow::Result<Self> {
        let c_name = CString::new(name).context("session name contains a NUL byte")?;
        // SAFETY: c_name is a valid NUL-terminated string for the whole call.
        let raw = unsafe { bench_open_session_c(c_name.as_ptr()) };
        let session = NonNull::new(raw)
            .with_context(|| format!("bench_open_session_c failed for session {name:?}"))?;
        Ok(Self {
            session,
            session_id: sanitize_component(name.trim()),
        })
    }
}

impl Recorder for FfiRecorder {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn record(&self, result: &CaseResult) -> anyhow::Result<()> {
        let key = CString::new(result.key.as_str())?;
        let name = CString::new(result.display_name.as_str())?;
        let language = CString::new(result.source_label.as_str())?;
        let durations: Vec<f64> = result.samples.iter().map(|s| s.duration_nanos).collect();

        // SAFETY: the session is open until drop; strings and the sample
        // buffer outlive the call.
        let code = unsafe {
            bench_log_samples_c(
                self.session.as_ptr(),
                key.as_ptr(),
                name.as_ptr(),
                language.as_ptr(),
                durations.as_ptr(),
                durations.len(),
            )
        };
        if code != BENCH_OK {
            bail!("bench_log_samples_c returned {code}");
        }
        Ok(())
    }
}

impl Drop for FfiRecorder {
    fn drop(&mut self) {
        // SAFETY: the pointer came from bench_open_session_c and is closed once.
        unsafe { bench_close_session_c(self.session.as_ptr()) };
    }
}

/// Run the bridged suite for `session_name` on a background thread.
///
/// Cases are measured on that thread and logged through the C ABI, so they
/// land in whatever store the global registry holds for the name.
pub fn spawn(
    registry: Arc<Registry>,
    filter: Option<Regex>,
    session_name: String,
    config: RunConfig,
) -> io::Result<JoinHandle<anyhow::Result<RunOutcome>>> {
    thread::Builder::new()
        .name("sessionbench-bridge".into())
        .spawn(move || {
            let recorder = FfiRecorder::open(&session_name)?;
            let plan = build_plan(&registry, filter.as_ref());
            Ok(Runner::new(recorder, config).run(&plan.cases))
        })
}

/// Run configuration for the bridged suite
pub fn run_config(config: &BenchConfig) -> RunConfig {
    RunConfig {
        defaults: Sampler::new(config.runner.warmup, config.runner.samples),
        source_label: config.bridge.source_label.clone(),
        fail_fast: config.runner.fail_fast,
        show_progress: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_case_produces_samples() {
        let registry = suite(Workload::quick());
        let sampler = Sampler::new(0, 2);
        for case in registry.iter() {
            assert_eq!(case.run(&sampler).len(), 2, "{}", case.key());
        }
    }

    #[test]
    fn test_open_rejects_nul() {
        assert!(FfiRecorder::open("bad\0name").is_err());
    }

    #[test]
    fn test_run_config_uses_bridge_label() {
        let config = run_config(&BenchConfig::default());
        assert_eq!(config.source_label, "C-ABI");
        assert_eq!(config.defaults, Sampler::new(3, 10));
    }
}
