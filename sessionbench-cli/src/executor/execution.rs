//! Case Execution
//!
//! Runs planned cases strictly one after another and hands each result to a
//! [`Recorder`].
//!
//! ## Data Flow
//!
//! ```text
//! CaseDef (from a suite registry)
//!        │
//!        ▼
//!   Sampler (warmup → timed samples)
//!        │
//!        ▼
//!   CaseResult (stats computed)
//!        │
//!        ▼
//!   Recorder (SessionStore directly, or the C ABI)
//! ```
//!
//! A panicking case is caught and reported as crashed; nothing is recorded for
//! it and the run moves on unless `fail_fast` is set. A recorder failure is
//! logged and the run continues.

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use sessionbench_core::{CaseDef, Registry, Sampler, pin_to_cpu};
use sessionbench_stats::StatsError;
use sessionbench_store::{CaseResult, SessionStore};
use std::io;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::planner::build_plan;

/// Destination for finished case results
pub trait Recorder {
    /// Session the results land in
    fn session_id(&self) -> &str;

    /// Persist one result
    fn record(&self, result: &CaseResult) -> anyhow::Result<()>;
}

impl Recorder for SessionStore {
    fn session_id(&self) -> &str {
        SessionStore::session_id(self)
    }

    fn record(&self, result: &CaseResult) -> anyhow::Result<()> {
        SessionStore::record(self, result)?;
        Ok(())
    }
}

impl<R: Recorder + ?Sized> Recorder for Arc<R> {
    fn session_id(&self) -> &str {
        (**self).session_id()
    }

    fn record(&self, result: &CaseResult) -> anyhow::Result<()> {
        (**self).record(result)
    }
}

/// Configuration for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Warmup and sample counts for cases without overrides
    pub defaults: Sampler,
    /// Label stamped on every result of this run
    pub source_label: String,
    /// Stop after the first crashed case
    pub fail_fast: bool,
    /// Draw a progress bar
    pub show_progress: bool,
}

impl RunConfig {
    /// Run configuration with default counts and no progress bar
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            defaults: Sampler::default(),
            source_label: source_label.into(),
            fail_fast: false,
            show_progress: false,
        }
    }
}

/// What happened to one case
#[derive(Debug, Clone, PartialEq)]
pub enum CaseStatus {
    /// Measured and persisted
    Recorded,
    /// Measured, but persisting failed
    NotPersisted(String),
    /// No samples were produced
    Skipped,
    /// The case panicked
    Crashed(String),
    /// The case returned a different number of samples than configured
    Invalid(String),
}

/// Outcome of a single case
#[derive(Debug, Clone)]
pub struct CaseOutcome {
    /// Case key
    pub key: String,
    /// Case display name
    pub display_name: String,
    /// Status
    pub status: CaseStatus,
    /// Result, when the case produced samples
    pub result: Option<CaseResult>,
}

/// Outcome of a whole run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Session the run wrote into
    pub session_id: String,
    /// Source label of the run
    pub source_label: String,
    /// Per-case outcomes in execution order
    pub cases: Vec<CaseOutcome>,
    /// True when `fail_fast` stopped the run early
    pub aborted: bool,
}

impl RunOutcome {
    /// Number of cases that crashed
    pub fn crashed(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| matches!(c.status, CaseStatus::Crashed(_)))
            .count()
    }

    /// Number of cases persisted
    pub fn recorded(&self) -> usize {
        self.cases
            .iter()
            .filter(|c| c.status == CaseStatus::Recorded)
            .count()
    }
}

/// Sequential case runner
pub struct Runner<R> {
    config: RunConfig,
    recorder: R,
}

impl<R: Recorder> Runner<R> {
    /// Create a runner writing through `recorder`
    pub fn new(recorder: R, config: RunConfig) -> Self {
        Self { config, recorder }
    }

    /// Run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Execute `cases` in order
    pub fn run(&self, cases: &[&CaseDef]) -> RunOutcome {
        let pb = if self.config.show_progress {
            let pb = ProgressBar::new(cases.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        tracing::info!(
            session = %self.recorder.session_id(),
            source = %self.config.source_label,
            cases = cases.len(),
            "run started"
        );

        let mut outcomes = Vec::with_capacity(cases.len());
        let mut aborted = false;
        for case in cases {
            pb.set_message(case.key().to_string());
            let outcome = self.execute_single(case);
            let crashed = matches!(outcome.status, CaseStatus::Crashed(_));
            outcomes.push(outcome);
            pb.inc(1);

            if crashed && self.config.fail_fast {
                tracing::warn!(key = %case.key(), "stopping run after crashed case");
                aborted = true;
                break;
            }
        }
        pb.finish_and_clear();

        let outcome = RunOutcome {
            session_id: self.recorder.session_id().to_string(),
            source_label: self.config.source_label.clone(),
            cases: outcomes,
            aborted,
        };
        tracing::info!(
            session = %outcome.session_id,
            source = %outcome.source_label,
            recorded = outcome.recorded(),
            crashed = outcome.crashed(),
            "run finished"
        );
        outcome
    }

    /// Execute a single case
    fn execute_single(&self, case: &CaseDef) -> CaseOutcome {
        let sampler = case.resolve_sampler(self.config.defaults);
        let mut outcome = CaseOutcome {
            key: case.key().to_string(),
            display_name: case.display_name().to_string(),
            status: CaseStatus::Skipped,
            result: None,
        };

        // Run with panic catching
        let durations = match catch_unwind(AssertUnwindSafe(|| case.run(&sampler))) {
            Ok(durations) => durations,
            Err(panic) => {
                let message = if let Some(s) = panic.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                tracing::warn!(key = %case.key(), error = %message, "case crashed");
                outcome.status = CaseStatus::Crashed(message);
                return outcome;
            }
        };

        if durations.len() != sampler.samples() {
            tracing::warn!(
                key = %case.key(),
                expected = sampler.samples(),
                got = durations.len(),
                "case returned an unexpected number of samples; not recorded"
            );
            outcome.status = CaseStatus::Invalid(format!(
                "expected {} samples, got {}",
                sampler.samples(),
                durations.len()
            ));
            return outcome;
        }

        let result = match CaseResult::from_durations(
            case.key(),
            case.display_name(),
            &self.config.source_label,
            &durations,
        ) {
            Ok(result) => result,
            Err(StatsError::EmptySamples) => {
                tracing::info!(key = %case.key(), "case produced no samples; skipped");
                return outcome;
            }
        };

        outcome.status = match self.recorder.record(&result) {
            Ok(()) => CaseStatus::Recorded,
            Err(e) => {
                let message = format!("{e:#}");
                tracing::warn!(key = %case.key(), error = %message, "failed to persist case");
                CaseStatus::NotPersisted(message)
            }
        };
        outcome.result = Some(result);
        outcome
    }
}

/// Run the cases of `registry` matching `filter` on a background thread.
///
/// The runner thread is optionally pinned to `pin_cpu`. `on_complete` is
/// called once with the final outcome before the thread exits; the outcome is
/// also the thread's return value.
pub fn spawn_run<R, F>(
    registry: Arc<Registry>,
    filter: Option<Regex>,
    recorder: R,
    config: RunConfig,
    pin_cpu: Option<usize>,
    on_complete: F,
) -> io::Result<JoinHandle<RunOutcome>>
where
    R: Recorder + Send + 'static,
    F: FnOnce(&RunOutcome) + Send + 'static,
{
    thread::Builder::new()
        .name("sessionbench-runner".into())
        .spawn(move || {
            if let Some(cpu) = pin_cpu {
                match pin_to_cpu(cpu) {
                    Ok(()) => tracing::debug!(cpu, "runner pinned"),
                    Err(e) => tracing::warn!(cpu, error = %e, "could not pin runner"),
                }
            }

            let plan = build_plan(&registry, filter.as_ref());
            let runner = Runner::new(recorder, config);
            let outcome = runner.run(&plan.cases);
            on_complete(&outcome);
            outcome
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionbench_store::SessionCatalog;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Collects results in memory
    #[derive(Default)]
    struct MemoryRecorder {
        results: Mutex<Vec<CaseResult>>,
        fail: bool,
    }

    impl Recorder for MemoryRecorder {
        fn session_id(&self) -> &str {
            "memory"
        }

        fn record(&self, result: &CaseResult) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("disk full");
            }
            self.results.lock().unwrap().push(result.clone());
            Ok(())
        }
    }

    fn config() -> RunConfig {
        RunConfig {
            defaults: Sampler::new(1, 4),
            ..RunConfig::new("Rust")
        }
    }

    fn suite() -> Registry {
        let mut registry = Registry::new();
        registry
            .case("first", "First", |s| s.run(|| 1 + 1))
            .case("boom", "Boom", |s| s.run(|| -> u32 { panic!("kaboom") }))
            .case("last", "Last", |s| s.run(|| vec![0u8; 16]));
        registry
    }

    #[test]
    fn test_runs_in_order_and_continues_after_panic() {
        let registry = suite();
        let recorder = Arc::new(MemoryRecorder::default());
        let runner = Runner::new(Arc::clone(&recorder), config());

        let plan = build_plan(&registry, None);
        let outcome = runner.run(&plan.cases);

        let keys: Vec<_> = outcome.cases.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, ["first", "boom", "last"]);
        assert_eq!(outcome.cases[1].status, CaseStatus::Crashed("kaboom".into()));
        assert!(!outcome.aborted);
        assert_eq!(outcome.recorded(), 2);

        let results = recorder.results.lock().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.sample_count() == 4));
        assert!(results.iter().all(|r| r.source_label == "Rust"));
    }

    #[test]
    fn test_fail_fast_stops_after_crash() {
        let registry = suite();
        let recorder = Arc::new(MemoryRecorder::default());
        let runner = Runner::new(
            Arc::clone(&recorder),
            RunConfig {
                fail_fast: true,
                ..config()
            },
        );

        let outcome = runner.run(&build_plan(&registry, None).cases);
        assert!(outcome.aborted);
        assert_eq!(outcome.cases.len(), 2);
        assert_eq!(recorder.results.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_zero_samples_is_skipped() {
        let mut registry = Registry::new();
        registry.register(CaseDef::new("empty", "Empty", |s| s.run(|| 0)).with_samples(0));
        let recorder = Arc::new(MemoryRecorder::default());

        let outcome = Runner::new(Arc::clone(&recorder), config()).run(&build_plan(&registry, None).cases);
        assert_eq!(outcome.cases[0].status, CaseStatus::Skipped);
        assert!(outcome.cases[0].result.is_none());
        assert!(recorder.results.lock().unwrap().is_empty());
    }

    #[test]
    fn test_sample_count_mismatch_not_recorded() {
        let mut registry = Registry::new();
        registry.register(CaseDef::new("short", "Short", |_| vec![5.0]).with_samples(10));
        registry.register(CaseDef::new("empty", "Empty", |_| Vec::new()).with_samples(3));
        registry.register(CaseDef::new("ok", "Ok", |s| s.run(|| 1)).with_samples(2));
        let recorder = Arc::new(MemoryRecorder::default());

        let outcome = Runner::new(Arc::clone(&recorder), config()).run(&build_plan(&registry, None).cases);
        assert_eq!(
            outcome.cases[0].status,
            CaseStatus::Invalid("expected 10 samples, got 1".into())
        );
        assert!(outcome.cases[0].result.is_none());
        assert!(matches!(outcome.cases[1].status, CaseStatus::Invalid(_)));
        assert_eq!(outcome.cases[2].status, CaseStatus::Recorded);

        let results = recorder.results.lock().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "ok");
    }

    #[test]
    fn test_persist_failure_continues() {
        let registry = suite();
        let recorder = MemoryRecorder {
            fail: true,
            ..Default::default()
        };

        let outcome = Runner::new(recorder, config()).run(&build_plan(&registry, None).cases);
        assert_eq!(outcome.cases.len(), 3);
        assert!(matches!(outcome.cases[0].status, CaseStatus::NotPersisted(_)));
        assert!(outcome.cases[0].result.is_some());
        assert!(matches!(outcome.cases[2].status, CaseStatus::NotPersisted(_)));
    }

    #[test]
    fn test_per_case_overrides() {
        let mut registry = Registry::new();
        registry.register(CaseDef::new("k", "K", |s| s.run(|| 1)).with_samples(7));
        let recorder = Arc::new(MemoryRecorder::default());

        Runner::new(Arc::clone(&recorder), config()).run(&build_plan(&registry, None).cases);
        assert_eq!(recorder.results.lock().unwrap()[0].sample_count(), 7);
    }

    #[test]
    fn test_spawn_run_writes_session() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(SessionStore::open(tmp.path(), Some("S1")).unwrap());
        let mut registry = Registry::new();
        registry
            .case("a", "A", |s| s.run(|| 1))
            .case("b", "B", |s| s.run(|| 2));

        let (tx, rx) = std::sync::mpsc::channel();
        let handle = spawn_run(
            Arc::new(registry),
            Some(Regex::new("^a$").unwrap()),
            Arc::clone(&store),
            config(),
            None,
            move |outcome| tx.send(outcome.recorded()).unwrap(),
        )
        .unwrap();

        let outcome = handle.join().unwrap();
        assert_eq!(rx.recv().unwrap(), 1);
        assert_eq!(outcome.session_id, "S1");

        let state = SessionCatalog::new(tmp.path()).load_all();
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.rows[0].key, "a");
        assert_eq!(state.rows[0].sample_count, 4);
    }
}
