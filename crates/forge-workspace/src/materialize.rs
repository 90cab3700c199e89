//! Fragment materialization into a staged workspace
//!
//! Copies exactly the referenced configuration subtrees out of a
//! cached revision checkout: the shared base, the archetype, the
//! environment and region overlays, and one subtree per enabled
//! component. Nothing else from the source tree enters the workspace.

use forge_fs::{NormalizedPath, io};
use forge_resolve::ResolvedConfiguration;
use forge_source::SourceCache;

use crate::Result;

/// Source-tree layout the fragment repository follows.
mod src_layout {
    pub const BASE: &str = "base";
    pub const ARCHETYPES: &str = "archetypes";
    pub const ENVIRONMENTS: &str = "environments";
    pub const REGIONS: &str = "regions";
    pub const COMPONENTS: &str = "components";
}

/// Workspace-side fragment directory, relative to the workspace root.
pub const FRAGMENTS_DIR: &str = "fragments";

/// Copy every referenced fragment into `staging`.
///
/// Returns the workspace-relative fragment paths in copy order, for
/// the descriptor. A fragment absent at the revision fails the tuple
/// (`MissingFragment`); the revision is immutable, so no retry helps.
pub fn materialize_fragments(
    cache: &SourceCache,
    resolved: &ResolvedConfiguration,
    staging: &NormalizedPath,
) -> Result<Vec<String>> {
    let revision = &resolved.revision.revision;
    let checkout = cache.checkout(revision)?;

    let mut copied = Vec::new();

    let mut copy = |src_rel: String, dst_rel: String| -> Result<()> {
        let src = cache.fragment(&checkout, revision, &src_rel)?;
        let dst = staging.join(&dst_rel);
        io::copy_tree(&src, &dst)?;
        tracing::debug!(fragment = %src_rel, "Fragment materialized");
        copied.push(dst_rel);
        Ok(())
    };

    copy(
        src_layout::BASE.to_string(),
        format!("{FRAGMENTS_DIR}/base"),
    )?;
    copy(
        format!("{}/{}", src_layout::ARCHETYPES, resolved.archetype),
        format!("{FRAGMENTS_DIR}/archetype"),
    )?;
    copy(
        format!("{}/{}", src_layout::ENVIRONMENTS, resolved.tuple.environment),
        format!("{FRAGMENTS_DIR}/environment"),
    )?;
    copy(
        format!("{}/{}", src_layout::REGIONS, resolved.tuple.region),
        format!("{FRAGMENTS_DIR}/region"),
    )?;

    for component in &resolved.components {
        copy(
            format!("{}/{}", src_layout::COMPONENTS, component),
            format!("{FRAGMENTS_DIR}/components/{component}"),
        )?;
    }

    Ok(copied)
}
