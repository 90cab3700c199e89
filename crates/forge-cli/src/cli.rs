//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// forge - Deterministic build-workspace generation from declarative catalogs
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Catalog directory
    #[arg(long, global = true, default_value = "catalog")]
    pub catalog: PathBuf,

    /// Source fragment repository (URL or local path)
    #[arg(long, global = true)]
    pub source: Option<String>,

    /// Revision cache directory (defaults to the platform cache dir)
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    /// Output directory for generated workspaces
    #[arg(long, global = true, default_value = "workspaces")]
    pub out: PathBuf,

    /// Treat policy findings as failures
    #[arg(long, global = true)]
    pub strict: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate (or fully regenerate) one workspace
    ///
    /// Writes the workspace for one (service, environment, region)
    /// tuple under the output directory, replacing any previous tree.
    ///
    /// Examples:
    ///   forge generate svc-a prod euw1 --source git@host:platform/fragments.git
    Generate {
        /// Service name
        service: String,

        /// Target environment
        environment: String,

        /// Target region
        region: String,
    },

    /// Generate every enabled tuple through the worker pool
    ///
    /// Expands the catalog into all enabled (service, environment,
    /// region) tuples, optionally filtered, and processes them in
    /// parallel. Tuple failures are isolated; the run exits non-zero
    /// if any tuple failed.
    Batch {
        /// Only process these services (repeatable)
        #[arg(long = "service")]
        services: Vec<String>,

        /// Only process this environment
        #[arg(long)]
        environment: Option<String>,

        /// Worker pool size
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },

    /// Validate an assembled workspace (read-only)
    Validate {
        /// Path to the workspace root
        workspace: PathBuf,
    },
}
