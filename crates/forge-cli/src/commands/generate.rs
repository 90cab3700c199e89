//! `forge generate <service> <environment> <region>`

use colored::Colorize;
use forge_resolve::TupleKey;
use forge_workspace::{Severity, generate_tuple};

use crate::cli::Cli;
use crate::error::Result;

use super::{generate_options, load_catalog, source_cache};

pub fn run_generate(cli: &Cli, service: &str, environment: &str, region: &str) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let cache = source_cache(cli)?;
    let opts = generate_options(cli);

    let tuple = TupleKey::new(service, environment, region);
    let generated = generate_tuple(&catalog, &cache, &tuple, &opts)?;

    println!(
        "{} {} -> {}",
        "generated".green().bold(),
        tuple,
        generated.path
    );
    println!("  revision:    {}", generated.revision.revision);
    println!("  fingerprint: {}", generated.fingerprint);

    for finding in &generated.report.findings {
        let tag = match finding.severity {
            Severity::Structural => "structural".red(),
            Severity::Policy => "policy".yellow(),
        };
        println!("  {} [{}] {}", tag, finding.code, finding.message);
    }

    Ok(())
}
