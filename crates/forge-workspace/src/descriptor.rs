//! The build descriptor written at the workspace root

use std::collections::BTreeMap;

use forge_resolve::ResolvedRevision;
use serde::{Deserialize, Serialize};

/// Descriptor file name inside every workspace.
pub const DESCRIPTOR_FILE: &str = "build.yaml";

/// Sentinel the CD orchestrator replaces with the real image reference
/// at deploy time. Deliberately not `{image}`: the validator treats
/// brace tokens as unsubstituted placeholders.
pub const IMAGE_PLACEHOLDER: &str = "__IMAGE__";

/// The build descriptor consumed by the downstream overlay-build step.
///
/// Every path in here is relative to the workspace root. The
/// descriptor never references the network or an external revision
/// checkout; the workspace is self-contained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDescriptor {
    pub api_version: String,

    pub service: String,
    pub environment: String,
    pub region: String,

    /// The immutable source revision the fragments were copied from,
    /// and the fallback rule that selected it. Informational: the
    /// fragment copies live inside the workspace.
    pub revision: ResolvedRevision,

    pub image: String,

    pub components: Vec<String>,

    /// Copied fragment directories, relative to the workspace root.
    pub fragments: Vec<String>,

    /// Generated patch files, relative to the workspace root.
    pub patches: Vec<String>,

    /// Merged functional + cost + monitoring labels.
    pub labels: BTreeMap<String, String>,

    /// Scaled budget table, environment -> monthly quantity.
    pub budgets: BTreeMap<String, f64>,

    /// Fingerprint over every other file in the workspace. Two
    /// generations with unchanged catalogs and revision produce the
    /// same value.
    pub fingerprint: String,
}

/// Current descriptor schema version.
pub const API_VERSION: &str = "forge/v1";
