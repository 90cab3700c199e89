//! Error types for forge-resolve
//!
//! All of these are fatal for a single tuple only; a batch run records
//! them and continues with sibling tuples.

/// Result type for forge-resolve operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during resolution
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A name lookup against a catalog table found nothing.
    #[error("Unknown reference: '{name}' not found in {table} (required by service '{service}')")]
    UnknownReference {
        table: String,
        name: String,
        service: String,
    },

    /// The tuple names an environment or region the service does not
    /// enable.
    #[error("Tuple {service}/{environment}/{region} is not enabled in the service catalog entry")]
    TupleNotEnabled {
        service: String,
        environment: String,
        region: String,
    },

    /// Substitution found a placeholder with no context value.
    /// Substitution is total; partial output is never produced.
    #[error("Unbound variable '{{{token}}}' at {path}")]
    UnboundVariable { token: String, path: String },

    /// A string leaf contains an unterminated placeholder.
    #[error("Malformed template at {path}: {message}")]
    MalformedTemplate { path: String, message: String },

    /// The revision fallback chain was exhausted.
    #[error(
        "No revision resolved for {service}/{environment}/{region}: \
         no channel, region pin, default channel, or environment pin applies"
    )]
    NoRevisionResolved {
        service: String,
        environment: String,
        region: String,
    },
}
