//! Configuration loading from sessionbench.toml
//!
//! SessionBench configuration can be specified in a `sessionbench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use sessionbench_core::{DEFAULT_SAMPLE_COUNT, DEFAULT_WARMUP_COUNT};
use sessionbench_store::{DEFAULT_STORAGE_ROOT, benchmarks_root};
use std::path::{Path, PathBuf};

/// Configuration file name looked up by [`BenchConfig::discover`]
pub const CONFIG_FILE: &str = "sessionbench.toml";

/// SessionBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Cross-runtime bridge configuration
    #[serde(default)]
    pub bridge: BridgeConfig,
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerConfig {
    /// Untimed iterations per case
    #[serde(default = "default_warmup")]
    pub warmup: usize,
    /// Timed iterations per case
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Stop the run after a case panics
    #[serde(default)]
    pub fail_fast: bool,
    /// Source label for natively executed cases
    #[serde(default = "default_native_label")]
    pub source_label: String,
    /// Pin the runner thread to this CPU
    #[serde(default)]
    pub pin_cpu: Option<usize>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            warmup: default_warmup(),
            samples: default_samples(),
            fail_fast: false,
            source_label: default_native_label(),
            pin_cpu: None,
        }
    }
}

fn default_warmup() -> usize {
    DEFAULT_WARMUP_COUNT
}
fn default_samples() -> usize {
    DEFAULT_SAMPLE_COUNT
}
fn default_native_label() -> String {
    "Rust".to_string()
}

/// Bridged suite configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Run the bridged suite alongside the native one
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Source label for cases logged through the C ABI
    #[serde(default = "default_bridge_label")]
    pub source_label: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source_label: default_bridge_label(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_bridge_label() -> String {
    "C-ABI".to_string()
}

/// Where sessions are stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Storage root; sessions live in `<root>/Benchmarks`
    #[serde(default = "default_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
        }
    }
}

impl StorageConfig {
    /// Directory holding one sub-directory per session
    pub fn sessions_root(&self) -> PathBuf {
        benchmarks_root(&self.root)
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(DEFAULT_STORAGE_ROOT)
}

/// Output format for history and run listings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable terminal output
    #[default]
    Human,
    /// JSON snapshot of the catalog
    Json,
    /// Flat CSV of summary rows
    Csv,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    /// Default output format: "human", "json" or "csv"
    #[serde(default)]
    pub format: OutputFormat,
}

impl BenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let dir = std::env::current_dir().ok()?;
        Self::discover_from(&dir)
    }

    /// Walk up from `start` looking for a configuration file
    pub fn discover_from(start: &Path) -> Option<Self> {
        let mut dir = start.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!(path = %config_path.display(), error = %e, "ignoring configuration");
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# SessionBench Configuration

[runner]
# Untimed iterations per case
warmup = 3
# Timed iterations per case
samples = 10
# Stop the run after a case panics
fail_fast = false
# Source label for native cases
source_label = "Rust"
# Pin the runner thread to a CPU (Linux only, uncomment to enable)
# pin_cpu = 0

[bridge]
# Run the bridged suite through the C ABI in the same session
enabled = true
source_label = "C-ABI"

[storage]
# Sessions are written to <root>/Benchmarks/<session>/
root = "target/sessionbench"

[output]
# Default output format: human, json, csv
format = "human"
"#
        .to_string()
    }
}
