//! forge CLI
//!
//! Turns declarative catalogs into deterministic, self-contained build
//! workspaces, one per (service, environment, region) tuple.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
            .expect("Failed to set tracing subscriber");
        tracing::debug!("Verbose mode enabled");
    }

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Generate {
            service,
            environment,
            region,
        } => commands::run_generate(cli, service, environment, region),
        Commands::Batch {
            services,
            environment,
            concurrency,
        } => commands::run_batch(cli, services, environment.as_deref(), *concurrency),
        Commands::Validate { workspace } => commands::run_validate(cli, workspace),
    }
}
