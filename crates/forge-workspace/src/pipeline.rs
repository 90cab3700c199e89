//! The per-tuple pipeline and the batch runner
//!
//! One independent task per (service, environment, region) tuple.
//! Within a tuple the stages run sequentially: resolve -> materialize
//! -> assemble -> publish -> validate. Between tuples the only shared
//! state is the read-only catalog snapshot and the revision cache.

use forge_catalog::Catalog;
use forge_fs::{NormalizedPath, io};
use forge_resolve::{TupleKey, resolve_tuple};
use forge_source::SourceCache;
use rayon::prelude::*;

use crate::assemble::assemble;
use crate::materialize::materialize_fragments;
use crate::validate::{ValidationReport, validate_workspace};
use crate::{Error, Result};

/// Options shared by generate and batch runs.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Root under which workspaces are published, laid out as
    /// `<out>/<service>/<environment>/<region>/`.
    pub out_dir: NormalizedPath,

    /// Upgrade policy findings to tuple failures.
    pub strict: bool,
}

/// A successfully generated workspace.
#[derive(Debug)]
pub struct GeneratedWorkspace {
    pub tuple: TupleKey,
    pub path: NormalizedPath,
    pub revision: forge_resolve::ResolvedRevision,
    pub fingerprint: String,
    pub report: ValidationReport,
}

/// Generate (or fully regenerate) the workspace for one tuple.
///
/// Assembly happens in a staging directory next to the target; the
/// target is replaced with a single rename only after every stage
/// succeeded. A failed tuple leaves no staging residue and never
/// publishes a half-written tree.
pub fn generate_tuple(
    catalog: &Catalog,
    cache: &SourceCache,
    tuple: &TupleKey,
    opts: &GenerateOptions,
) -> Result<GeneratedWorkspace> {
    let parent = opts.out_dir.join(&tuple.service).join(&tuple.environment);
    let target = parent.join(&tuple.region);
    let staging = parent.join(&format!(".{}.staging", tuple.region));

    let staged = stage_workspace(catalog, cache, tuple, &staging);
    let (fingerprint, revision) = match staged {
        Ok(staged) => staged,
        Err(e) => {
            // Cancelled or failed tuples are discarded as a unit.
            let _ = io::remove_dir_if_exists(&staging);
            return Err(e);
        }
    };

    io::publish_dir(&staging, &target)?;
    tracing::info!(tuple = %tuple, path = %target, "Workspace published");

    let report = validate_workspace(&target)?;
    if opts.strict && !report.passed(true) {
        return Err(Error::PolicyFailure {
            tuple: tuple.to_string(),
            count: report.policy().count(),
        });
    }

    Ok(GeneratedWorkspace {
        tuple: tuple.clone(),
        path: target,
        revision,
        fingerprint,
        report,
    })
}

fn stage_workspace(
    catalog: &Catalog,
    cache: &SourceCache,
    tuple: &TupleKey,
    staging: &NormalizedPath,
) -> Result<(String, forge_resolve::ResolvedRevision)> {
    // Leftovers from an interrupted previous run.
    io::remove_dir_if_exists(staging)?;

    let resolved = resolve_tuple(catalog, tuple)?;
    let fragments = materialize_fragments(cache, &resolved, staging)?;
    let fingerprint = assemble(&resolved, fragments, staging)?;
    Ok((fingerprint, resolved.revision))
}

/// Outcome of one tuple in a batch run.
#[derive(Debug)]
pub struct TupleOutcome {
    pub tuple: TupleKey,
    pub result: std::result::Result<GeneratedWorkspace, String>,
}

/// Aggregate result of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TupleOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TupleOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TupleOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Expand the catalog into the enabled tuple list.
///
/// `services` filters by name when non-empty; `environment` narrows to
/// one environment.
pub fn enabled_tuples(
    catalog: &Catalog,
    services: &[String],
    environment: Option<&str>,
) -> Vec<TupleKey> {
    let mut tuples = Vec::new();
    for (name, service) in &catalog.services {
        if !services.is_empty() && !services.contains(name) {
            continue;
        }
        for env in &service.environments {
            if environment.is_some_and(|wanted| wanted != env.as_str()) {
                continue;
            }
            for region in &service.regions {
                tuples.push(TupleKey::new(name.clone(), env.clone(), region.clone()));
            }
        }
    }
    tuples
}

/// Run a set of tuples through a bounded worker pool.
///
/// Tuples are embarrassingly parallel; one tuple's failure is recorded
/// and the rest keep going. The report is ordered like the input
/// regardless of completion order.
pub fn run_batch(
    catalog: &Catalog,
    cache: &SourceCache,
    tuples: Vec<TupleKey>,
    opts: &GenerateOptions,
    concurrency: usize,
) -> Result<BatchReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build()
        .map_err(|e| Error::WorkerPool {
            message: e.to_string(),
        })?;

    tracing::info!(tuples = tuples.len(), concurrency, "Starting batch run");

    let outcomes = pool.install(|| {
        tuples
            .par_iter()
            .map(|tuple| {
                let result =
                    generate_tuple(catalog, cache, tuple, opts).map_err(|e| e.to_string());
                if let Err(message) = &result {
                    tracing::error!(tuple = %tuple, %message, "Tuple failed");
                }
                TupleOutcome {
                    tuple: tuple.clone(),
                    result,
                }
            })
            .collect()
    });

    Ok(BatchReport { outcomes })
}
