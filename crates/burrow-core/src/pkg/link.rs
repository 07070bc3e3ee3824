//! Symlink/junction creation in the install root.
//!
//! The install root is flat: it holds one link per package name, and the
//! most recent install of a name wins regardless of version.

use super::error::PkgError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of `pkg_name`'s link inside `install_root`.
///
/// Scoped packages nest under their scope directory
/// (`<root>/@scope/name`).
#[must_use]
pub fn link_path(install_root: &Path, pkg_name: &str) -> PathBuf {
    match pkg_name.split_once('/') {
        Some((scope, name)) if pkg_name.starts_with('@') => install_root.join(scope).join(name),
        _ => install_root.join(pkg_name),
    }
}

/// Link a cached package into the install root.
///
/// Creates a symlink (Unix) or junction (Windows) from
/// `<install_root>/<name>` to the cached package directory, replacing
/// whatever was there before.
///
/// # Errors
/// Returns an error if the parent directory or the link cannot be created.
pub fn link_package(
    install_root: &Path,
    pkg_name: &str,
    cached_pkg_dir: &Path,
) -> Result<PathBuf, PkgError> {
    let link_path = link_path(install_root, pkg_name);

    // A missing entry is the common case.
    if remove_link_or_dir(&link_path).is_ok() {
        debug!(name = pkg_name, path = %link_path.display(), "Replaced existing entry");
    }

    if let Some(parent) = link_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            PkgError::link_failed(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let target = if cached_pkg_dir.is_absolute() {
        cached_pkg_dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| PkgError::link_failed(format!("Failed to read current dir: {e}")))?
            .join(cached_pkg_dir)
    };

    create_dir_link(&target, &link_path)?;

    Ok(link_path)
}

/// Remove a symlink, junction, file, or directory.
fn remove_link_or_dir(path: &Path) -> std::io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;

    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;

        // FILE_ATTRIBUTE_REPARSE_POINT = 0x400
        if metadata.file_attributes() & 0x400 != 0 {
            return fs::remove_dir(path);
        }
    }

    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Create a directory link (symlink on Unix, junction on Windows).
fn create_dir_link(src: &Path, dst: &Path) -> Result<(), PkgError> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(src, dst).map_err(|e| {
            PkgError::link_failed(format!(
                "Failed to create symlink from {} to {}: {e}",
                dst.display(),
                src.display()
            ))
        })?;
    }

    #[cfg(windows)]
    {
        junction::create(src, dst).map_err(|e| {
            PkgError::link_failed(format!(
                "Failed to create junction from {} to {}: {e}",
                dst.display(),
                src.display()
            ))
        })?;
    }

    #[cfg(not(any(unix, windows)))]
    {
        copy_dir_all(src, dst)
            .map_err(|e| PkgError::link_failed(format!("Failed to copy directory: {e}")))?;
    }

    Ok(())
}

#[cfg(not(any(unix, windows)))]
fn copy_dir_all(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        if ty.is_dir() {
            copy_dir_all(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }
    Ok(())
}
