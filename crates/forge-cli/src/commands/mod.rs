//! Command implementations

mod batch;
mod generate;
mod validate;

pub use batch::run_batch;
pub use generate::run_generate;
pub use validate::run_validate;

use forge_catalog::{Catalog, CatalogLoader};
use forge_fs::NormalizedPath;
use forge_source::SourceCache;
use forge_workspace::GenerateOptions;

use crate::cli::Cli;
use crate::error::{CliError, Result};

/// Load the catalog named on the command line.
pub(crate) fn load_catalog(cli: &Cli) -> Result<Catalog> {
    let root = NormalizedPath::new(&cli.catalog);
    // Canonicalize so relative --catalog paths survive later chdirs;
    // a missing directory is reported by the loader.
    let root = match root.canonicalize() {
        Ok(canonical) => canonical,
        Err(_) => root,
    };
    Ok(CatalogLoader::new().load(&root)?)
}

/// Build the revision cache from `--source`/`--cache`.
pub(crate) fn source_cache(cli: &Cli) -> Result<SourceCache> {
    let source = cli
        .source
        .as_deref()
        .ok_or_else(|| CliError::user("--source is required for this command"))?;

    let cache_dir = match &cli.cache {
        Some(dir) => NormalizedPath::new(dir),
        None => {
            let base = dirs::cache_dir()
                .ok_or_else(|| CliError::user("no platform cache directory; pass --cache"))?;
            NormalizedPath::new(base.join("forge"))
        }
    };

    Ok(SourceCache::new(source, cache_dir))
}

/// Shared generate options.
pub(crate) fn generate_options(cli: &Cli) -> GenerateOptions {
    GenerateOptions {
        out_dir: NormalizedPath::new(&cli.out),
        strict: cli.strict,
    }
}
