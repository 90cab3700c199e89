//! `forge batch` - generate every enabled tuple

use colored::Colorize;
use forge_workspace::{enabled_tuples, run_batch as run_workspace_batch};

use crate::cli::Cli;
use crate::error::{CliError, Result};

use super::{generate_options, load_catalog, source_cache};

pub fn run_batch(
    cli: &Cli,
    services: &[String],
    environment: Option<&str>,
    concurrency: usize,
) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let cache = source_cache(cli)?;
    let opts = generate_options(cli);

    let tuples = enabled_tuples(&catalog, services, environment);
    if tuples.is_empty() {
        println!("No enabled tuples match the given filters.");
        return Ok(());
    }

    let report = run_workspace_batch(&catalog, &cache, tuples, &opts, concurrency)?;

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(generated) => println!(
                "{} {} ({})",
                "ok".green().bold(),
                outcome.tuple,
                generated.revision.revision
            ),
            Err(message) => println!("{} {}: {}", "failed".red().bold(), outcome.tuple, message),
        }
    }

    let failed = report.failed().count();
    if failed > 0 {
        return Err(CliError::user(format!(
            "{failed} of {} tuple(s) failed",
            report.outcomes.len()
        )));
    }

    println!("{} {} workspace(s) generated", "done".green().bold(), report.outcomes.len());
    Ok(())
}
