//! Custom Suite Example
//!
//! Registers a handful of cases, runs them into one session and prints the
//! history for the keys it just measured.
//!
//! Run with:
//!   cargo run --example custom_suite
//!   SESSIONBENCH_ROOT=/tmp/bench cargo run --example custom_suite

use sessionbench::prelude::*;
use sessionbench::{SessionCatalog, format_history_human};
use std::hint::black_box;

fn suite() -> Registry {
    let mut registry = Registry::new();

    registry.case("vector_sum", "Vec<i64> sum (1000)", |s| {
        let data: Vec<i64> = (0..1000).collect();
        s.run(|| data.iter().sum::<i64>())
    });

    // Fresh input per sample; only the sort is timed
    registry.case("sort_unstable", "sort_unstable (10_000 reversed)", |s| {
        s.run_with_setup(
            || (0..10_000u32).rev().collect::<Vec<_>>(),
            |mut v| {
                v.sort_unstable();
                v
            },
        )
    });

    registry.register(
        CaseDef::new("string_format", "format! of two integers", |s| {
            s.run(|| format!("{}-{}", black_box(42), black_box(17)))
        })
        .with_warmup(10)
        .with_samples(50),
    );

    registry
}

fn main() -> anyhow::Result<()> {
    let mut config = BenchConfig::default();
    if let Some(root) = std::env::var_os("SESSIONBENCH_ROOT") {
        config.storage.root = root.into();
    }

    let run = run_session(&config, suite(), None, &RunOptions::default())?;
    print!("{}", format_run_output(&run.native));
    println!("\nSession folder: {}\n", run.session_dir.display());

    let history = SessionCatalog::new(config.storage.sessions_root()).load_all();
    print!("{}", format_history_human(&history));
    Ok(())
}
