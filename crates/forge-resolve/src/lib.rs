//! Resolution pipeline: references, overrides, variables, revisions
//!
//! Pure logic over a loaded [`forge_catalog::Catalog`] snapshot. No I/O
//! happens here; the output is an immutable [`ResolvedConfiguration`]
//! value per (service, environment, region) tuple, consumed by the
//! materialization and assembly stages.

pub mod error;
pub mod merge;
pub mod refs;
pub mod resolved;
pub mod revision;
pub mod subst;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Error, Result};
pub use refs::{ResolvedReferences, resolve_references};
pub use resolved::{ResolvedConfiguration, TupleKey, resolve_tuple};
pub use revision::{ResolvedRevision, RevisionRule, resolve_revision};
pub use subst::SubstitutionContext;
