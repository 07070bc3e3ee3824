//! Package cache management.
//!
//! Extracted packages live at `<root>/<name>/<version>/`, where scoped
//! names have their `/` replaced by `_` so every package is a single
//! directory level. An entry is never modified once it exists.

use super::error::PkgError;
use super::install::ResolvedPackage;
use super::tarball::{download_tarball, extract_tgz_atomic, MAX_TARBALL_SIZE};
use reqwest::Client;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Package cache manager.
#[derive(Debug, Clone)]
pub struct PackageCache {
    /// Root directory for the package cache.
    root: PathBuf,
}

/// Where a package ended up in the cache, and whether it was already there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub from_cache: bool,
}

impl PackageCache {
    /// Create a package cache under `base` (usually `paths::cache_dir()`).
    #[must_use]
    pub fn new(base: &Path) -> Self {
        Self {
            root: base.join("npm"),
        }
    }

    /// Create a cache rooted exactly at `root`.
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    /// Get the cache root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the directory path for a cached package version.
    #[must_use]
    pub fn package_dir(&self, name: &str, version: &str) -> PathBuf {
        self.root.join(name.replace('/', "_")).join(version)
    }

    /// Check if a package version is already cached.
    ///
    /// Existence of the directory is the only check; contents are trusted.
    #[must_use]
    pub fn is_cached(&self, name: &str, version: &str) -> bool {
        self.package_dir(name, version).exists()
    }

    /// Make sure `pkg` is extracted in the cache, downloading it from
    /// `tarball_url` if it is not.
    ///
    /// # Errors
    /// Returns an error if the download, decompression, or extraction fails.
    pub async fn ensure_cached(
        &self,
        http: &Client,
        pkg: &ResolvedPackage,
        tarball_url: &str,
    ) -> Result<CacheEntry, PkgError> {
        let path = self.package_dir(&pkg.name, &pkg.version);

        if path.exists() {
            debug!(package = %pkg, path = %path.display(), "Using cached package");
            return Ok(CacheEntry {
                path,
                from_cache: true,
            });
        }

        info!(package = %pkg, url = %tarball_url, "Downloading");
        let bytes = download_tarball(http, tarball_url, MAX_TARBALL_SIZE).await?;
        debug!(size = bytes.len(), "Downloaded tarball");

        extract_tgz_atomic(&bytes, &path)?;
        debug!(path = %path.display(), "Extracted to cache");

        Ok(CacheEntry {
            path,
            from_cache: false,
        })
    }
}
