//! Post-run stages: artifact files and the final summary.
//!
//! Both write to a caller-supplied sink (stdout in the binary).

use std::io::{self, Write};

use colored::Colorize;
use log::error;

use crate::collector::runner::RunOutcome;
use crate::config::Config;
use crate::loot;
use crate::output;
use crate::progress::ProgressTracker;

// ------------------------------------------------------------
// Output + loot
// ------------------------------------------------------------
//
// Local I/O failures are logged and tallied as artifact errors;
// they never abort the process. Only a failing `writer` is
// returned as an error.
//
pub fn write_artifacts<W: Write>(
    module: &str,
    config: &Config,
    outcome: &RunOutcome,
    progress: &ProgressTracker,
    writer: &mut W,
) -> io::Result<()> {
    if outcome.items.is_empty() {
        return Ok(());
    }

    let verbosity = config.output.verbosity;
    if verbosity >= 2 {
        writeln!(writer)?;
        write!(writer, "{}", output::render_table(&outcome.items))?;
    }

    match output::write_results(&outcome.items, &config.output, &config.profile) {
        Ok(Some(path)) => writeln!(writer, "[{}] Output written to [{}]", module.cyan(), path.display())?,
        Ok(None) => {}
        Err(e) => {
            error!("{e:#}");
            progress.record_artifact_error();
        }
    }

    let profile_dir = output::profile_dir(&config.output, &config.profile);
    match loot::write_loot(&outcome.items, &profile_dir) {
        Ok(path) => {
            if verbosity > 2 {
                writeln!(writer)?;
                writeln!(
                    writer,
                    "[{}] {}\n",
                    module.cyan(),
                    "Use the commands below to retrieve the secrets that look interesting".green()
                )?;
                write!(writer, "{}", loot::render_loot(&outcome.items))?;
                writeln!(writer, "[{}] {}\n", module.cyan(), "End of loot file.".green())?;
            }
            writeln!(writer, "[{}] Loot written to [{}]", module.cyan(), path.display())?;
        }
        Err(e) => {
            error!("{e:#}");
            progress.record_artifact_error();
        }
    }
    Ok(())
}

/// Final summary. Always states the observed count, zero included.
pub fn write_report<W: Write>(
    module: &str,
    outcome: &RunOutcome,
    progress: &ProgressTracker,
    writer: &mut W,
) -> io::Result<()> {
    let snap = progress.snapshot();

    if outcome.items.is_empty() {
        writeln!(
            writer,
            "[{}] No secrets found, skipping the creation of an output file.",
            module.cyan()
        )?;
    } else {
        writeln!(writer, "[{}] {} secrets found.", module.cyan(), outcome.items.len())?;
    }

    if snap.errored > 0 || snap.artifact_errors > 0 {
        writeln!(
            writer,
            "[{}] {} listing errors, {} output errors (see log).",
            module.cyan(),
            snap.errored.to_string().yellow(),
            snap.artifact_errors.to_string().yellow()
        )?;
    }
    Ok(())
}
