//! Error types for forge-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from forge-catalog (schema errors abort the whole run)
    #[error(transparent)]
    Catalog(#[from] forge_catalog::Error),

    /// Error from forge-workspace (per-tuple pipeline failures)
    #[error(transparent)]
    Workspace(#[from] forge_workspace::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code per the error taxonomy: schema errors abort
    /// the whole run with a distinct code, everything else is a plain
    /// failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Catalog(forge_catalog::Error::Schema { .. }) => 2,
            _ => 1,
        }
    }
}
