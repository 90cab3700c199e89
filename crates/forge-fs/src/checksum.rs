//! SHA-256 checksum utilities
//!
//! Single canonical checksum format (`sha256:<hex>`) used for workspace
//! fingerprints and idempotence verification.

use sha2::{Digest, Sha256};

use crate::{Error, NormalizedPath, Result};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of string content.
pub fn compute_content_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
pub fn compute_file_checksum(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    let content = std::fs::read(&native).map_err(|e| Error::io(&native, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

/// Compute a fingerprint over an entire directory tree.
///
/// Hashes every file's workspace-relative path and contents in sorted
/// order, so two trees with identical layout and bytes always produce
/// the same fingerprint regardless of creation order or platform.
pub fn compute_tree_fingerprint(root: &NormalizedPath) -> Result<String> {
    let mut files = Vec::new();
    collect_files(root, root, &mut files)?;
    files.sort();

    let mut hasher = Sha256::new();
    for rel in &files {
        let content = {
            let native = root.join(rel).to_native();
            std::fs::read(&native).map_err(|e| Error::io(&native, e))?
        };
        hasher.update(rel.as_bytes());
        hasher.update([0u8]);
        hasher.update(&content);
        hasher.update([0u8]);
    }
    Ok(format!("{}{:x}", PREFIX, hasher.finalize()))
}

fn collect_files(
    root: &NormalizedPath,
    dir: &NormalizedPath,
    out: &mut Vec<String>,
) -> Result<()> {
    let native = dir.to_native();
    let entries = std::fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(&native, e))?;
        let name = entry.file_name();
        let child = dir.join(&name.to_string_lossy());
        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            collect_files(root, &child, out)?;
        } else if let Some(rel) = child.relative_to(root) {
            out.push(rel);
        }
    }
    Ok(())
}
