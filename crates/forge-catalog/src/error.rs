//! Error types for forge-catalog

use std::path::PathBuf;

/// Result type for forge-catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or validating catalogs
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed catalog content. Fatal for the whole run: no tuple
    /// processing starts on a catalog that failed to load.
    #[error("Schema error in {file}: {message}")]
    Schema { file: PathBuf, message: String },

    #[error("Catalog directory not found: {path}")]
    CatalogDirNotFound { path: PathBuf },

    #[error(transparent)]
    Fs(#[from] forge_fs::Error),
}

impl Error {
    pub fn schema(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Schema {
            file: file.into(),
            message: message.into(),
        }
    }
}
