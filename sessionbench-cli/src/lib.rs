#![warn(missing_docs)]
//! SessionBench CLI Library
//!
//! This module provides the CLI infrastructure for the `sessionbench` binary
//! and for programs that bring their own suites.
//!
//! # Example
//!
//! ```ignore
//! use sessionbench_cli::{BenchConfig, RunOptions, run_session};
//! use sessionbench_core::Registry;
//!
//! let mut suite = Registry::new();
//! suite.case("sum", "Sum 1..1000", |s| s.run(|| (1..=1000u64).sum::<u64>()));
//!
//! let run = run_session(&BenchConfig::default(), suite, None, &RunOptions::default())?;
//! println!("{}", run.session_dir.display());
//! ```

mod config;
mod executor;
mod planner;

pub mod cases;

pub use config::*;
pub use executor::{
    CaseOutcome, CaseStatus, Recorder, RunConfig, RunOutcome, Runner, filter_history,
    format_case_line, format_history_csv, format_history_human, format_history_json,
    format_run_output, short_session, spawn_run,
};
pub use planner::{ExecutionPlan, build_plan};

use anyhow::{Context, anyhow, bail};
use cases::Workload;
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use sessionbench_bridge::SessionRegistry;
use sessionbench_core::{Registry, Sampler};
use sessionbench_store::{CatalogState, HistoryModel, SessionCatalog, default_session_name};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// SessionBench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "sessionbench")]
#[command(author, version, about = "SessionBench - session-based micro-benchmark harness")]
pub struct Cli {
    /// Subcommand; defaults to `run`
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (default: nearest sessionbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage root; sessions are written to <ROOT>/Benchmarks
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the built-in suites into one session
    Run(RunArgs),
    /// List registered cases
    List {
        /// Filter cases by regex on the key
        #[arg(default_value = ".*")]
        filter: String,
    },
    /// Show recorded history
    History {
        /// Only rows for this case key
        #[arg(long)]
        key: Option<String>,
        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
    /// Delete every recorded session
    Delete,
    /// Write a default sessionbench.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Arguments of `sessionbench run`
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Filter cases by regex on the key
    #[arg(default_value = ".*")]
    pub filter: String,

    /// Session name (default: current UTC time)
    #[arg(long)]
    pub session: Option<String>,

    /// Skip the suite bridged through the C ABI
    #[arg(long)]
    pub no_bridge: bool,

    /// Untimed iterations per case
    #[arg(long)]
    pub warmup: Option<usize>,

    /// Timed iterations per case
    #[arg(long, short = 'n')]
    pub samples: Option<usize>,

    /// Stop the run after a case panics
    #[arg(long)]
    pub fail_fast: bool,

    /// Use tiny problem sizes (smoke runs)
    #[arg(long)]
    pub quick: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Options for one session run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run cases whose key matches
    pub filter: Option<Regex>,
    /// Session name (default: current UTC time)
    pub session: Option<String>,
    /// Draw a progress bar for the native suite
    pub show_progress: bool,
}

/// Everything a session run produced
#[derive(Debug, Clone)]
pub struct SessionRun {
    /// Session identifier
    pub session_id: String,
    /// Session directory
    pub session_dir: PathBuf,
    /// Native suite outcome
    pub native: RunOutcome,
    /// Bridged suite outcome, when it ran
    pub bridged: Option<RunOutcome>,
}

/// Run the SessionBench CLI with the given arguments.
/// This is the main entry point for the binary.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the SessionBench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    init_tracing(cli.verbose);

    // Discover sessionbench.toml configuration (CLI flags override)
    let mut config = match &cli.config {
        Some(path) => BenchConfig::load(path)?,
        None => BenchConfig::discover().unwrap_or_default(),
    };
    if let Some(root) = &cli.root {
        config.storage.root = root.clone();
    }

    match cli.command {
        Some(Commands::Run(args)) => run_benchmarks(&args, config),
        Some(Commands::List { filter }) => list_cases(&filter),
        Some(Commands::History { key, format }) => {
            show_history(&config, key.as_deref(), format.unwrap_or(config.output.format))
        }
        Some(Commands::Delete) => delete_history(&config),
        Some(Commands::Init { force }) => init_config(Path::new(CONFIG_FILE), force),
        None => run_benchmarks(
            &RunArgs {
                filter: ".*".to_string(),
                ..RunArgs::default()
            },
            config,
        ),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "sessionbench=debug"
    } else {
        "sessionbench=info"
    };
    // A subscriber may already be set when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Run configuration for the native suite
pub fn native_run_config(config: &BenchConfig) -> RunConfig {
    RunConfig {
        defaults: Sampler::new(config.runner.warmup, config.runner.samples),
        source_label: config.runner.source_label.clone(),
        fail_fast: config.runner.fail_fast,
        show_progress: false,
    }
}

/// Run `native` (and `bridged`, if given) into one session.
///
/// The native suite runs first on the runner thread and writes straight into
/// the session store. The bridged suite then runs on its own thread and logs
/// through the C ABI into the same session.
pub fn run_session(
    config: &BenchConfig,
    native: Registry,
    bridged: Option<Registry>,
    options: &RunOptions,
) -> anyhow::Result<SessionRun> {
    let sessions_root = config.storage.sessions_root();
    let session_name = options.session.clone().unwrap_or_else(default_session_name);

    // The bridged suite reaches the store through the global registry, so the
    // native side must attach through the same one.
    let local;
    let registry = if bridged.is_some() {
        SessionRegistry::install_global(&sessions_root)?
    } else {
        local = SessionRegistry::new(&sessions_root);
        &local
    };
    let handle = registry
        .open(Some(&session_name))
        .with_context(|| format!("opening session {session_name:?}"))?;
    let session_id = handle.session_id().to_string();
    let session_dir = handle.store().session_dir().to_path_buf();

    let mut native_config = native_run_config(config);
    native_config.show_progress = options.show_progress;
    let native = spawn_run(
        Arc::new(native),
        options.filter.clone(),
        Arc::clone(handle.store()),
        native_config,
        config.runner.pin_cpu,
        |outcome| {
            tracing::debug!(
                session = %outcome.session_id,
                recorded = outcome.recorded(),
                "native suite complete"
            );
        },
    )
    .context("spawning runner thread")?
    .join()
    .map_err(|_| anyhow!("runner thread panicked"))?;

    let bridged = match bridged {
        Some(suite) if !native.aborted => {
            let outcome = cases::bridged::spawn(
                Arc::new(suite),
                options.filter.clone(),
                session_id.clone(),
                cases::bridged::run_config(config),
            )
            .context("spawning bridge thread")?
            .join()
            .map_err(|_| anyhow!("bridge thread panicked"))?;
            match outcome {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    let message = format!("{e:#}");
                    tracing::warn!(error = %message, "bridged suite did not run");
                    None
                }
            }
        }
        _ => None,
    };

    handle.close();
    tracing::info!(session = %session_id, dir = %session_dir.display(), "session complete");

    Ok(SessionRun {
        session_id,
        session_dir,
        native,
        bridged,
    })
}

fn run_benchmarks(args: &RunArgs, mut config: BenchConfig) -> anyhow::Result<()> {
    if let Some(warmup) = args.warmup {
        config.runner.warmup = warmup;
    }
    if let Some(samples) = args.samples {
        config.runner.samples = samples;
    }
    if args.fail_fast {
        config.runner.fail_fast = true;
    }
    if args.no_bridge {
        config.bridge.enabled = false;
    }
    let format = args.format.unwrap_or(config.output.format);

    let filter = Regex::new(&args.filter)
        .with_context(|| format!("invalid filter regex {:?}", args.filter))?;
    let workload = if args.quick {
        Workload::quick()
    } else {
        Workload::default()
    };

    let native = cases::native::suite(workload);
    let bridged = config
        .bridge
        .enabled
        .then(|| cases::bridged::suite(workload));

    if build_plan(&native, Some(&filter)).is_empty() {
        println!("No cases matched {:?}.", args.filter);
        return Ok(());
    }

    let options = RunOptions {
        filter: Some(filter),
        session: args.session.clone(),
        show_progress: format == OutputFormat::Human,
    };
    let run = run_session(&config, native, bridged, &options)?;

    match format {
        OutputFormat::Human => {
            print!("{}", format_run_output(&run.native));
            if let Some(bridged) = &run.bridged {
                print!("{}", format_run_output(bridged));
            }
            println!("\nSession folder: {}", run.session_dir.display());
        }
        OutputFormat::Json | OutputFormat::Csv => {
            let state = session_history(&config, &run.session_id);
            print!("{}", render_history(&state, format)?);
        }
    }

    if run.native.crashed() > 0 || run.bridged.as_ref().is_some_and(|b| b.crashed() > 0) {
        tracing::warn!("some cases crashed; see output above");
    }
    Ok(())
}

/// Catalog rows of one session
fn session_history(config: &BenchConfig, session_id: &str) -> CatalogState {
    let state = SessionCatalog::new(config.storage.sessions_root()).load_all();
    CatalogState {
        rows: state
            .rows
            .into_iter()
            .filter(|row| row.session_id == session_id)
            .collect(),
        session_ids: vec![session_id.to_string()],
        latest_session_id: Some(session_id.to_string()),
    }
}

fn render_history(state: &CatalogState, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Human => format_history_human(state),
        OutputFormat::Json => format_history_json(state)? + "\n",
        OutputFormat::Csv => format_history_csv(state),
    })
}

fn list_cases(filter: &str) -> anyhow::Result<()> {
    let re = Regex::new(filter).with_context(|| format!("invalid filter regex {filter:?}"))?;
    let workload = Workload::default();

    println!("SessionBench Plan:");
    let mut total = 0;
    for (suite, registry) in [
        ("native", cases::native::suite(workload)),
        ("bridged", cases::bridged::suite(workload)),
    ] {
        let plan = build_plan(&registry, Some(&re));
        println!("├── suite: {suite}");
        for case in &plan.cases {
            println!("│   ├── {} ({})", case.key(), case.display_name());
        }
        total += plan.len();
    }
    println!("{total} cases found.");
    Ok(())
}

fn show_history(config: &BenchConfig, key: Option<&str>, format: OutputFormat) -> anyhow::Result<()> {
    let model = HistoryModel::new(SessionCatalog::new(config.storage.sessions_root()));
    let state = model
        .reload_in_background()
        .context("spawning history thread")?
        .join()
        .map_err(|_| anyhow!("history thread panicked"))?;

    let state = match key {
        Some(key) => filter_history(&state, key),
        None => state,
    };
    print!("{}", render_history(&state, format)?);
    Ok(())
}

fn delete_history(config: &BenchConfig) -> anyhow::Result<()> {
    let root = config.storage.sessions_root();
    let model = HistoryModel::new(SessionCatalog::new(&root));
    model
        .delete_all_in_background()
        .context("spawning history thread")?
        .join()
        .map_err(|_| anyhow!("history thread panicked"))?
        .with_context(|| format!("deleting {}", root.display()))?;
    println!("Deleted all sessions under {}", root.display());
    Ok(())
}

fn init_config(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    std::fs::write(path, BenchConfig::default_toml())
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(tmp: &TempDir) -> BenchConfig {
        let mut config = BenchConfig::default();
        config.storage.root = tmp.path().to_path_buf();
        config.runner.warmup = 1;
        config.runner.samples = 3;
        config
    }

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::parse_from([
            "sessionbench",
            "run",
            "^vec_",
            "--session",
            "S1",
            "--no-bridge",
            "-n",
            "5",
        ]);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.filter, "^vec_");
                assert_eq!(args.session.as_deref(), Some("S1"));
                assert!(args.no_bridge);
                assert_eq!(args.samples, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_history() {
        let cli = Cli::parse_from(["sessionbench", "history", "--key", "k", "--format", "json"]);
        match cli.command {
            Some(Commands::History { key, format }) => {
                assert_eq!(key.as_deref(), Some("k"));
                assert_eq!(format, Some(OutputFormat::Json));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_run_session_without_bridge() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        let options = RunOptions {
            filter: Some(Regex::new("^vec_push").unwrap()),
            session: Some("S1".into()),
            show_progress: false,
        };

        let run = run_session(&config, cases::native::suite(Workload::quick()), None, &options)
            .unwrap();
        assert_eq!(run.session_id, "S1");
        assert_eq!(run.native.recorded(), 2);
        assert!(run.bridged.is_none());
        assert!(run.session_dir.join("summary.csv").exists());

        let state = SessionCatalog::new(config.storage.sessions_root()).load_all();
        assert_eq!(state.rows.len(), 2);
        assert!(state.rows.iter().all(|r| r.source_label == "Rust" && r.sample_count == 3));
    }

    #[test]
    fn test_session_history_filters_session() {
        let tmp = TempDir::new().unwrap();
        let config = config_in(&tmp);
        for session in ["A", "B"] {
            let options = RunOptions {
                filter: Some(Regex::new("^string_").unwrap()),
                session: Some(session.into()),
                show_progress: false,
            };
            run_session(&config, cases::native::suite(Workload::quick()), None, &options).unwrap();
        }

        let state = session_history(&config, "B");
        assert_eq!(state.rows.len(), 2);
        assert!(state.rows.iter().all(|r| r.session_id == "B"));
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONFIG_FILE);

        init_config(&path, false).unwrap();
        assert!(init_config(&path, false).is_err());
        init_config(&path, true).unwrap();

        let config = BenchConfig::load(&path).unwrap();
        assert_eq!(config, BenchConfig::default());
    }

    #[test]
    fn test_delete_history_on_empty_root() {
        let tmp = TempDir::new().unwrap();
        delete_history(&config_in(&tmp)).unwrap();
    }
}
