//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partial
/// file. An advisory lock guards against concurrent writers of the same
/// target.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Temp file lives in the same directory so the rename stays on one
    // filesystem.
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Copy a directory tree recursively.
///
/// Entries are visited in sorted order so repeated copies of the same
/// source produce identical trees. Symlinks are followed; special files
/// are skipped.
pub fn copy_tree(src: &NormalizedPath, dst: &NormalizedPath) -> Result<()> {
    let src_native = src.to_native();
    if !src_native.is_dir() {
        return Err(Error::SourceNotFound { path: src_native });
    }

    fs::create_dir_all(dst.to_native()).map_err(|e| Error::io(dst.to_native(), e))?;

    let mut entries: Vec<_> = fs::read_dir(&src_native)
        .map_err(|e| Error::io(&src_native, e))?
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(&src_native, e))?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        let child_src = src.join(&name_str);
        let child_dst = dst.join(&name_str);

        let file_type = entry.file_type().map_err(|e| Error::io(entry.path(), e))?;
        if file_type.is_dir() {
            copy_tree(&child_src, &child_dst)?;
        } else if file_type.is_file() || file_type.is_symlink() {
            fs::copy(child_src.to_native(), child_dst.to_native())
                .map_err(|e| Error::io(child_src.to_native(), e))?;
        } else {
            tracing::warn!(path = %child_src, "Skipping special file during tree copy");
        }
    }

    Ok(())
}

/// Publish a staged directory over a target path.
///
/// The previous target tree is removed first, then the staged tree is
/// moved into place with a single rename. Callers stage into a sibling
/// of the target so the rename never crosses filesystems.
pub fn publish_dir(staged: &NormalizedPath, target: &NormalizedPath) -> Result<()> {
    let target_native = target.to_native();

    if let Some(parent) = target_native.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    if target_native.exists() {
        fs::remove_dir_all(&target_native).map_err(|e| Error::io(&target_native, e))?;
    }

    fs::rename(staged.to_native(), &target_native)
        .map_err(|e| Error::io(&target_native, e))?;

    Ok(())
}

/// Remove a directory tree if it exists.
pub fn remove_dir_if_exists(path: &NormalizedPath) -> Result<()> {
    let native = path.to_native();
    if native.exists() {
        fs::remove_dir_all(&native).map_err(|e| Error::io(&native, e))?;
    }
    Ok(())
}
