//! Error types for forge-source

/// Result type for forge-source operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while fetching or reading source revisions
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network/IO-class fault while cloning or fetching. Retried with
    /// bounded exponential backoff before surfacing.
    #[error("Failed to fetch revision '{revision}' from {source_repo}: {message}")]
    RevisionFetch {
        source_repo: String,
        revision: String,
        message: String,
    },

    /// The revision does not exist in the source repository. Not a
    /// network fault; never retried.
    #[error("Revision '{revision}' not found in source repository {source_repo}")]
    RevisionNotFound {
        source_repo: String,
        revision: String,
    },

    /// A referenced fragment directory is absent at the resolved
    /// revision. Fatal and non-retryable.
    #[error("Fragment '{fragment}' not found at revision '{revision}'")]
    MissingFragment { fragment: String, revision: String },

    #[error(transparent)]
    Fs(#[from] forge_fs::Error),
}
