//! Tarball download and extraction.

use super::error::PkgError;
use bytes::Bytes;
use flate2::read::GzDecoder;
use reqwest::Client;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path};
use std::time::Duration;
use tar::Archive;

/// Maximum tarball size (200 MB).
pub const MAX_TARBALL_SIZE: u64 = 200 * 1024 * 1024;

/// Download timeout in seconds.
const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

/// Root directory every registry tarball wraps its contents in.
const PACKAGE_ROOT: &str = "package";

/// Download a tarball from a URL.
///
/// # Errors
/// Returns an error if the download fails or exceeds the size limit.
pub async fn download_tarball(client: &Client, url: &str, max_bytes: u64) -> Result<Bytes, PkgError> {
    let response = client
        .get(url)
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .send()
        .await
        .map_err(|e| PkgError::archive_fetch(format!("Failed to download '{url}': {e}")))?;

    if !response.status().is_success() {
        return Err(PkgError::archive_fetch(format!(
            "Download failed with status {} for '{url}'",
            response.status()
        )));
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(PkgError::archive_fetch(format!(
                "Tarball too large: {len} bytes (max: {max_bytes})"
            )));
        }
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PkgError::archive_fetch(format!("Failed to read response body: {e}")))?;

    if bytes.len() as u64 > max_bytes {
        return Err(PkgError::archive_fetch(format!(
            "Tarball too large: {} bytes (max: {max_bytes})",
            bytes.len()
        )));
    }

    Ok(bytes)
}

/// Extract a gzipped tarball into `dest` atomically.
///
/// Only entries under `package/` are extracted, with that prefix stripped.
/// Extraction happens in a staging directory next to `dest`, which is
/// renamed onto `dest` once every entry has been written, so `dest`
/// either does not exist or is complete.
///
/// # Errors
/// Returns an error if the data is not gzip, the archive is malformed, or
/// an entry cannot be written.
pub fn extract_tgz_atomic(bytes: &[u8], dest: &Path) -> Result<(), PkgError> {
    let parent = dest
        .parent()
        .ok_or_else(|| PkgError::extract_failed("Destination has no parent"))?;

    fs::create_dir_all(parent).map_err(|e| {
        PkgError::cache_error(format!("Failed to create {}: {e}", parent.display()))
    })?;

    // Another process may have finished the same package meanwhile.
    if dest.exists() {
        return Ok(());
    }

    let staging = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempdir_in(parent)
        .map_err(|e| PkgError::cache_error(format!("Failed to create staging dir: {e}")))?;

    extract_tgz_to(bytes, staging.path())?;

    // The staging dir is created owner-only; entries are shared.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755)).map_err(|e| {
            PkgError::cache_error(format!("Failed to set staging dir permissions: {e}"))
        })?;
    }

    match fs::rename(staging.path(), dest) {
        Ok(()) => Ok(()),
        Err(_) if dest.exists() => Ok(()),
        Err(e) => Err(PkgError::extract_failed(format!(
            "Failed to move extracted package to {}: {e}",
            dest.display()
        ))),
    }
}

fn extract_tgz_to(bytes: &[u8], dest: &Path) -> Result<(), PkgError> {
    let mut tar_bytes = Vec::new();
    GzDecoder::new(bytes)
        .read_to_end(&mut tar_bytes)
        .map_err(|e| PkgError::decompression(format!("Invalid gzip stream: {e}")))?;

    let mut archive = Archive::new(tar_bytes.as_slice());

    for entry in archive
        .entries()
        .map_err(|e| PkgError::extract_failed(format!("Failed to read tarball entries: {e}")))?
    {
        let mut entry = entry
            .map_err(|e| PkgError::extract_failed(format!("Failed to read tarball entry: {e}")))?;

        let path = entry
            .path()
            .map_err(|e| PkgError::extract_failed(format!("Failed to read entry path: {e}")))?
            .into_owned();

        let path_str = path.to_string_lossy();

        let Ok(relative) = path.strip_prefix(PACKAGE_ROOT) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(PkgError::extract_failed(format!(
                "Tarball entry escapes the package root: {path_str}"
            )));
        }

        let dest_path = dest.join(relative);
        let entry_type = entry.header().entry_type();
        let mode = entry.header().mode().ok();

        let written = if entry_type.is_dir() {
            create_dir_with_mode(&dest_path, mode)
        } else if entry_type.is_file() {
            write_file(&mut entry, &dest_path, mode)
        } else {
            // Symlinks and special entries are never extracted.
            continue;
        };

        written.map_err(|e| {
            PkgError::extract_failed(format!("Failed to extract {path_str}: {e}"))
        })?;
    }

    Ok(())
}

fn create_dir_with_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        if let Some(mode) = mode {
            builder.mode(mode);
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    builder.create(path)
}

fn write_file(entry: &mut impl Read, path: &Path, mode: Option<u32>) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(path)?;
    io::copy(entry, &mut file)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Some(mode) = mode {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}
