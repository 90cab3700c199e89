//! Content-addressed revision checkout cache
//!
//! Checkout-once, copy-many: the first task needing a revision fetches
//! it under a per-revision lock; concurrent tasks for the same revision
//! wait on that lock instead of re-fetching. A `.complete` marker next
//! to the checkout makes the fast path crash safe — a checkout without
//! its marker is discarded and rebuilt.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use forge_fs::NormalizedPath;

use crate::{Error, Result, fetch};

/// Retry budget for network-class faults.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub initial_interval: Duration,
    pub max_interval: Duration,
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        fetch::default_policy()
    }
}

/// Shared, thread-safe revision cache over one source repository.
pub struct SourceCache {
    /// URL or local path of the fragment repository.
    source: String,
    cache_dir: NormalizedPath,
    policy: RetryPolicy,
    /// Per-revision fetch locks. The map lock is held only to look up
    /// or insert an entry, never across a fetch.
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SourceCache {
    pub fn new(source: impl Into<String>, cache_dir: NormalizedPath) -> Self {
        Self {
            source: source.into(),
            cache_dir,
            policy: RetryPolicy::default(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Checkout directory for a revision, fetching it if needed.
    ///
    /// The returned tree is read-only shared state: many tuples may
    /// reference it concurrently, and nothing may write into it.
    pub fn checkout(&self, revision: &str) -> Result<NormalizedPath> {
        let checkout_dir = self.checkout_dir(revision);
        let marker = self.marker_path(revision);

        // Lock-free fast path once a checkout is complete.
        if marker.is_file() && checkout_dir.is_dir() {
            tracing::debug!(%revision, "Revision cache hit");
            return Ok(checkout_dir);
        }

        let lock = self.revision_lock(revision);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        // Another task may have completed the checkout while this one
        // waited on the lock.
        if marker.is_file() && checkout_dir.is_dir() {
            tracing::debug!(%revision, "Revision checked out while waiting");
            return Ok(checkout_dir);
        }

        self.fetch_into(revision, &checkout_dir, &marker)?;
        Ok(checkout_dir)
    }

    /// Resolve a fragment subdirectory inside a checkout.
    ///
    /// Absence is fatal and non-retryable: the revision is immutable,
    /// so a missing fragment will stay missing.
    pub fn fragment(
        &self,
        checkout: &NormalizedPath,
        revision: &str,
        fragment: &str,
    ) -> Result<NormalizedPath> {
        let dir = checkout.join(fragment);
        if !dir.is_dir() {
            return Err(Error::MissingFragment {
                fragment: fragment.to_string(),
                revision: revision.to_string(),
            });
        }
        Ok(dir)
    }

    fn fetch_into(
        &self,
        revision: &str,
        checkout_dir: &NormalizedPath,
        marker: &NormalizedPath,
    ) -> Result<()> {
        tracing::info!(source = %self.source, %revision, "Checking out revision");

        // A dir without its marker is a crashed previous attempt.
        forge_fs::io::remove_dir_if_exists(checkout_dir)?;

        let mirror_dir = self.cache_dir.join("mirror.git");
        let repo = fetch::open_or_clone_mirror(&self.source, &mirror_dir, &self.policy)?;

        match fetch::export_tree(&repo, &self.source, revision, checkout_dir) {
            Ok(()) => {}
            Err(Error::RevisionNotFound { .. }) => {
                // The mirror may predate the revision; refresh once.
                fetch::refresh_mirror(&repo, &self.source, revision, &self.policy)?;
                fetch::export_tree(&repo, &self.source, revision, checkout_dir)?;
            }
            Err(e) => return Err(e),
        }

        forge_fs::io::write_text(marker, revision)?;
        Ok(())
    }

    fn revision_lock(&self, revision: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(revision.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn checkout_dir(&self, revision: &str) -> NormalizedPath {
        self.cache_dir.join("checkouts").join(revision)
    }

    fn marker_path(&self, revision: &str) -> NormalizedPath {
        self.cache_dir.join("checkouts").join(&format!("{revision}.complete"))
    }
}
