//! `forge validate <workspace-path>` - read-only workspace check

use std::path::Path;

use colored::Colorize;
use forge_fs::NormalizedPath;
use forge_workspace::{Severity, validate_workspace};

use crate::cli::Cli;
use crate::error::{CliError, Result};

pub fn run_validate(cli: &Cli, workspace: &Path) -> Result<()> {
    let root = NormalizedPath::new(workspace);
    let report = validate_workspace(&root)?;

    for finding in &report.findings {
        let tag = match finding.severity {
            Severity::Structural => "structural".red().bold(),
            Severity::Policy => "policy".yellow().bold(),
        };
        match &finding.path {
            Some(path) => println!("{} [{}] {} ({})", tag, finding.code, finding.message, path),
            None => println!("{} [{}] {}", tag, finding.code, finding.message),
        }
    }

    if report.passed(cli.strict) {
        println!("{} {}", "valid".green().bold(), root);
        Ok(())
    } else {
        Err(CliError::user(format!(
            "validation failed with {} finding(s)",
            report.findings.len()
        )))
    }
}
