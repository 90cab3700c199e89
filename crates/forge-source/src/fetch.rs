//! git2 plumbing: mirror maintenance and tree export

use std::time::Duration;

use backoff::ExponentialBackoff;
use forge_fs::NormalizedPath;
use git2::build::CheckoutBuilder;
use git2::{ErrorClass, Repository};

use crate::cache::RetryPolicy;
use crate::{Error, Result};

/// Open the bare mirror of the source repository, cloning it on first
/// use. Clone failures retry under the policy.
pub(crate) fn open_or_clone_mirror(
    source: &str,
    mirror_dir: &NormalizedPath,
    policy: &RetryPolicy,
) -> Result<Repository> {
    if mirror_dir.is_dir() {
        if let Ok(repo) = Repository::open_bare(mirror_dir.to_native()) {
            return Ok(repo);
        }
        // A half-cloned mirror is useless; throw it away and re-clone.
        tracing::warn!(mirror = %mirror_dir, "Mirror unreadable, recloning");
        forge_fs::io::remove_dir_if_exists(mirror_dir)?;
    }

    with_retries(source, "<clone>", policy, || {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.bare(true);
        let repo = Repository::init_opts(mirror_dir.to_native(), &opts)?;
        {
            // A previous attempt may have added the remote already.
            let mut remote = match repo.find_remote("origin") {
                Ok(remote) => remote,
                Err(_) => repo.remote_with_fetch("origin", source, "+refs/*:refs/*")?,
            };
            remote.fetch(&["+refs/*:refs/*"], None, None)?;
        }
        Ok(repo)
    })
}

/// Fetch the remote again, picking up revisions published since the
/// mirror was last updated.
pub(crate) fn refresh_mirror(
    repo: &Repository,
    source: &str,
    revision: &str,
    policy: &RetryPolicy,
) -> Result<()> {
    with_retries(source, revision, policy, || {
        let mut remote = repo.find_remote("origin")?;
        remote.fetch(&["+refs/*:refs/*"], None, None)?;
        Ok(())
    })
}

/// Export a revision's tree into `dest`.
///
/// The revision may be a tag, branch, or commit id. A revision the
/// mirror does not contain is `RevisionNotFound` — callers refresh the
/// mirror once before giving up.
pub(crate) fn export_tree(
    repo: &Repository,
    source: &str,
    revision: &str,
    dest: &NormalizedPath,
) -> Result<()> {
    let object = repo
        .revparse_single(revision)
        .map_err(|_| Error::RevisionNotFound {
            source_repo: source.to_string(),
            revision: revision.to_string(),
        })?;
    let commit = object.peel_to_commit().map_err(|_| Error::RevisionNotFound {
        source_repo: source.to_string(),
        revision: revision.to_string(),
    })?;
    let tree = commit.tree().map_err(|e| fetch_error(source, revision, &e))?;

    std::fs::create_dir_all(dest.to_native())
        .map_err(|e| forge_fs::Error::io(dest.to_native(), e))?;

    let mut checkout = CheckoutBuilder::new();
    checkout.target_dir(dest.as_ref());
    checkout.force();
    repo.checkout_tree(tree.as_object(), Some(&mut checkout))
        .map_err(|e| fetch_error(source, revision, &e))?;

    Ok(())
}

/// Run a git operation under bounded exponential backoff.
///
/// Only network/IO-class faults are transient; everything else is
/// permanent and surfaces immediately.
fn with_retries<T>(
    source: &str,
    revision: &str,
    policy: &RetryPolicy,
    mut op: impl FnMut() -> std::result::Result<T, git2::Error>,
) -> Result<T> {
    let backoff = ExponentialBackoff {
        initial_interval: policy.initial_interval,
        max_interval: policy.max_interval,
        max_elapsed_time: Some(policy.max_elapsed),
        ..ExponentialBackoff::default()
    };

    backoff::retry(backoff, || {
        op().map_err(|e| {
            if is_transient(&e) {
                tracing::warn!(%source, %revision, error = %e.message(), "Transient fetch fault, retrying");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    })
    .map_err(|e| match e {
        backoff::Error::Permanent(e) | backoff::Error::Transient { err: e, .. } => {
            fetch_error(source, revision, &e)
        }
    })
}

fn is_transient(error: &git2::Error) -> bool {
    matches!(
        error.class(),
        ErrorClass::Net | ErrorClass::Http | ErrorClass::Os | ErrorClass::Ssl
    )
}

fn fetch_error(source: &str, revision: &str, error: &git2::Error) -> Error {
    Error::RevisionFetch {
        source_repo: source.to_string(),
        revision: revision.to_string(),
        message: error.message().to_string(),
    }
}

/// Reasonable delay curve for interactive use: sub-second first retry,
/// capped well below a minute in total.
pub(crate) fn default_policy() -> RetryPolicy {
    RetryPolicy {
        initial_interval: Duration::from_millis(250),
        max_interval: Duration::from_secs(5),
        max_elapsed: Duration::from_secs(30),
    }
}
