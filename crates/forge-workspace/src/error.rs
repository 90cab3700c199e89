//! Error types for forge-workspace

use std::path::PathBuf;

/// Result type for forge-workspace operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during materialization, assembly, or
/// validation. All per-tuple; a batch run isolates them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The workspace under validation is structurally broken (missing
    /// or unparseable descriptor, dangling paths). Policy findings are
    /// NOT errors; they live in the validation report.
    #[error("Workspace corrupt at {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// Strict mode upgrade: policy findings failed the tuple.
    #[error("Strict validation failed for {tuple}: {count} policy finding(s)")]
    PolicyFailure { tuple: String, count: usize },

    /// The batch worker pool could not be built.
    #[error("Failed to build worker pool: {message}")]
    WorkerPool { message: String },

    #[error(transparent)]
    Resolve(#[from] forge_resolve::Error),

    #[error(transparent)]
    Source(#[from] forge_source::Error),

    #[error(transparent)]
    Fs(#[from] forge_fs::Error),
}

impl Error {
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }
}
