// ------------------------------------------------------------
// Module declarations
// ------------------------------------------------------------
//
// - config:    Run configuration loaded from JSON
// - schema:    Items, source kinds and paging primitives
// - aws:       Credentials, SigV4 signing, JSON API client
// - sources:   Paginated source implementations and registry
// - progress:  Shared region counters
// - status:    Live status line
// - collector: Fan-out workers, fan-in collector, orchestration
// - output:    Table / JSON rendering of the results
// - loot:      Follow-up fetch commands
// - report:    Artifact writing and the final summary
//
mod aws;
mod collector;
mod config;
mod loot;
mod output;
mod progress;
mod report;
mod schema;
mod sources;
mod status;

use std::env;
use std::io;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use colored::Colorize;
use log::info;
use rustls::crypto::{CryptoProvider, ring};

use aws::{AwsJsonClient, Credentials};
use collector::runner::{RunSettings, run_enumeration};
use config::Config;
use progress::ProgressTracker;
use sources::get_source;

const MODULE: &str = "secrets";
const DEFAULT_CONFIG: &str = "config.json";

#[tokio::main]
async fn main() -> Result<()> {
    // rustls >= 0.23 needs a process-wide provider before the first
    // TLS connection.
    CryptoProvider::install_default(ring::default_provider())
        .map_err(|_| anyhow!("failed to install rustls CryptoProvider"))?;

    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = Config::load(&config_path)?;
    init_logging(&config);

    let credentials = Credentials::from_env()?;
    let client = AwsJsonClient::new(
        credentials,
        config.endpoint_override.as_deref(),
        config.request_timeout(),
    )?;
    let sources = config
        .sources
        .iter()
        .map(|kind| get_source(*kind, &client))
        .collect();

    let labels: Vec<&str> = config.sources.iter().map(|k| k.label()).collect();
    println!(
        "[{}] Enumerating secrets for profile {} in {} regions.",
        MODULE.cyan(),
        config.profile,
        config.regions.len()
    );
    println!("[{}] Supported Services: {}", MODULE.cyan(), labels.join(", "));

    let progress = Arc::new(ProgressTracker::new());
    let settings = RunSettings {
        module: MODULE,
        intake_capacity: config.intake_capacity,
        status_interval: config.status_interval(),
    };

    let outcome = run_enumeration(&config.regions, sources, &settings, Arc::clone(&progress)).await?;
    info!(
        "enumeration finished: {} items, {} region errors",
        outcome.items.len(),
        outcome.progress.errored
    );

    let mut stdout = io::stdout().lock();
    report::write_artifacts(MODULE, &config, &outcome, &progress, &mut stdout)?;
    report::write_report(MODULE, &outcome, &progress, &mut stdout)?;
    Ok(())
}

// ------------------------------------------------------------
// Logging
// ------------------------------------------------------------
//
// `RUST_LOG` always wins. Without it the level is `info`, or
// `debug` when `debug.log` is set in the config.
//
fn init_logging(config: &Config) {
    let default_level = if config.debug_logging() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}
