//! Workspace materialization, assembly, and validation
//!
//! Takes a [`forge_resolve::ResolvedConfiguration`] plus a checked-out
//! source revision and produces the self-contained build workspace for
//! one tuple: copied fragments, generated patch/label files, and a
//! local-only build descriptor. Also hosts the per-tuple pipeline and
//! the bounded-parallel batch runner.

pub mod assemble;
pub mod descriptor;
pub mod error;
pub mod materialize;
pub mod pipeline;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_support;

pub use descriptor::BuildDescriptor;
pub use error::{Error, Result};
pub use pipeline::{
    BatchReport, GenerateOptions, GeneratedWorkspace, TupleOutcome, enabled_tuples,
    generate_tuple, run_batch,
};
pub use validate::{Finding, Severity, ValidationReport, validate_workspace};
