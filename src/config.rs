use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::schema::SourceKind;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// This is the top-level configuration structure loaded from
// `config.json` (or the path given as first argument).
//
// It defines:
// - Which regions and sources to enumerate
// - Where and how results are written
// - Run tuning (intake size, status cadence, timeouts)
// - Optional debug configuration
//
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Label for the output directory, usually the AWS profile name
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Regions to enumerate; an empty list is a valid no-op run
    #[serde(default)]
    pub regions: Vec<String>,

    /// Source kinds to run in every region
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceKind>,

    #[serde(default)]
    pub output: OutputConfig,

    /// Status line refresh interval in milliseconds
    #[serde(default = "default_status_interval_ms")]
    pub status_interval_ms: u64,

    /// Bounded collector intake size
    #[serde(default = "default_intake_capacity")]
    pub intake_capacity: usize,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Sends every request to this URL instead of the regional
    /// endpoint (local emulators, tests)
    pub endpoint_override: Option<String>,

    /// Optional debug configuration
    pub debug: Option<DebugConfig>,
}

// ------------------------------------------------------------
// Output configuration
// ------------------------------------------------------------
//
// Notes:
// - `verbosity` >= 2 prints the table, > 2 also prints the loot
// - Files land under `<directory>/<profile>/`
//
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default = "default_verbosity")]
    pub verbosity: u8,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Enables debug-level logging when `RUST_LOG` is unset
    pub log: Option<bool>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            format: OutputFormat::default(),
            verbosity: default_verbosity(),
        }
    }
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_sources() -> Vec<SourceKind> {
    SourceKind::ALL.to_vec()
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_verbosity() -> u8 {
    1
}

fn default_status_interval_ms() -> u64 {
    250
}

fn default_intake_capacity() -> usize {
    256
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects settings the run cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.intake_capacity == 0 {
            bail!("intake_capacity must be at least 1");
        }
        if self.status_interval_ms == 0 {
            bail!("status_interval_ms must be greater than 0");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than 0");
        }

        let mut seen = HashSet::new();
        for region in &self.regions {
            if region.trim().is_empty() {
                bail!("region names must not be empty");
            }
            if !seen.insert(region.as_str()) {
                bail!("region `{region}` is listed more than once");
            }
        }

        let mut seen = HashSet::new();
        for kind in &self.sources {
            if !seen.insert(*kind) {
                bail!("source `{kind}` is listed more than once");
            }
        }
        Ok(())
    }

    pub fn debug_logging(&self) -> bool {
        self.debug
            .as_ref()
            .is_some_and(|d| d.log.unwrap_or(false))
    }

    pub fn status_interval(&self) -> Duration {
        Duration::from_millis(self.status_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
