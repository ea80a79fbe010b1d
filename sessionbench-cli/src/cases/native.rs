//! Native Suite
//!
//! Everyday standard-library operations: `Vec`, `HashMap`, `HashSet`,
//! closures, `Box` and `String`.

use super::Workload;
use sessionbench_core::Registry;
use std::collections::{HashMap, HashSet};
use std::hint::black_box;

/// Build the native suite
pub fn suite(w: Workload) -> Registry {
    let mut registry = Registry::new();

    registry.case(
        "vec_push_reserve",
        format!("Vec::push with reserve ({})", w.appends),
        move |s| {
            s.run(|| {
                let mut v: Vec<usize> = Vec::with_capacity(w.appends);
                for i in 0..w.appends {
                    v.push(i);
                }
                v
            })
        },
    );

    registry.case(
        "vec_push_no_reserve",
        format!("Vec::push without reserve ({})", w.appends),
        move |s| {
            s.run(|| {
                let mut v: Vec<usize> = Vec::new();
                for i in 0..w.appends {
                    v.push(i);
                }
                v
            })
        },
    );

    registry.case(
        "vec_insert_at_zero",
        format!("Vec::insert at 0 ({})", w.front_inserts),
        move |s| {
            s.run(|| {
                let mut v: Vec<usize> = Vec::new();
                for i in 0..w.front_inserts {
                    v.insert(0, i);
                }
                v
            })
        },
    );

    registry.case(
        "hashmap_lookup_hit",
        format!("HashMap lookup hit (size={}, ops={})", w.table_size, w.lookups),
        move |s| {
            let table: HashMap<usize, usize> = (0..w.table_size).map(|i| (i, i)).collect();
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
        format!("HashSet::contains (size={}, ops={})", w.table_size, w.lookups),
        move |s| {
            let set: HashSet<usize> = (0..w.table_size).collect();
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
        format!("for loop + for_each ({})", w.iterations),
        move |s| {
            let values: Vec<usize> = (0..w.iterations).collect();
            s.run(|| {
                let mut for_sum = 0usize;
                for v in &values {
                    for_sum = for_sum.wrapping_add(*v);
                }
                let mut each_sum = 0usize;
                values.iter().for_each(|v| each_sum = each_sum.wrapping_add(*v));
                (for_sum, each_sum)
            })
        },
    );

    registry.case(
        "closure-non-captured",
        format!("Closure call, non-capturing (calls={})", w.calls),
        move |s| {
            let non_capturing = || 1usize;
            s.run(|| {
                let mut acc = 0usize;
                for _ in 0..w.calls {
                    acc = acc.wrapping_add(black_box(&non_capturing)());
                }
                acc
            })
        },
    );

    registry.case(
        "closure-captured",
        format!("Closure call, capturing (calls={})", w.calls),
        move |s| {
            let value = black_box(1usize);
            let capturing = move || value;
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
        format!("Box allocation overhead ({} boxes)", w.allocations),
        move |s| {
            s.run(|| {
                let mut sum = 0usize;
                for i in 0..w.allocations {
                    let boxed = black_box(Box::new(i));
                    sum = sum.wrapping_add(*boxed);
                }
                sum
            })
        },
    );

    registry.case(
        "string_concatenation",
        format!("String concatenation ({} parts)", w.parts),
        move |s| {
            s.run(|| {
                let mut out = String::new();
                for i in 0..w.parts {
                    out += &i.to_string();
                }
                out
            })
        },
    );

    registry.case(
        "string_reserve_append",
        format!("String reserve + push_str ({} parts)", w.parts),
        move |s| {
            s.run(|| {
                let mut out = String::with_capacity(w.parts * 2);
                for i in 0..w.parts {
                    out.push_str(&i.to_string());
                }
                out
            })
        },
    );

    registry
}
