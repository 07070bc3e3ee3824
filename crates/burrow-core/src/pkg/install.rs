//! Recursive package installation.
//!
//! An [`Installer`] resolves a specifier, makes sure the archive is in the
//! cache, links it into the install root, and then installs every declared
//! dependency the same way, one at a time.
//!
//! Repeat work is suppressed at two levels, both scoped to one `Installer`:
//! - requested `(name, selector)` pairs seen before return immediately,
//!   without contacting the registry;
//! - resolved `(name, version)` pairs seen before are relinked, so the
//!   install root stays last-writer-wins, but are not fetched or recursed
//!   into again, which also stops dependency cycles.
//!
//! Both sets are marked before the work they guard, so a failure is not
//! retried by a later request for the same key.

use super::cache::PackageCache;
use super::error::PkgError;
use super::link::link_package;
use super::registry::RegistryClient;
use super::spec::PackageSpec;
use crate::config::Config;
use futures::future::BoxFuture;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A concrete package identity: the unit of memoization and cache addressing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
}

impl ResolvedPackage {
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for ResolvedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// A package linked into the install root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub link_path: PathBuf,
    pub cache_path: PathBuf,
    /// Whether the cache already held this version.
    pub from_cache: bool,
}

/// What one [`Installer::install`] call linked, dependencies included,
/// in installation order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub installed: Vec<InstalledPackage>,
}

impl InstallReport {
    /// Number of packages that had to be downloaded.
    #[must_use]
    pub fn downloaded(&self) -> usize {
        self.installed.iter().filter(|p| !p.from_cache).count()
    }

    /// Number of packages served from the cache.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.installed.iter().filter(|p| p.from_cache).count()
    }
}

/// Drives resolution, caching, linking, and dependency recursion.
#[derive(Debug)]
pub struct Installer {
    registry: RegistryClient,
    cache: PackageCache,
    install_root: PathBuf,
    requested: HashSet<PackageSpec>,
    resolved: HashSet<ResolvedPackage>,
}

impl Installer {
    #[must_use]
    pub fn new(registry: RegistryClient, cache: PackageCache, install_root: PathBuf) -> Self {
        Self {
            registry,
            cache,
            install_root,
            requested: HashSet::new(),
            resolved: HashSet::new(),
        }
    }

    /// Build an installer from the CLI configuration.
    ///
    /// # Errors
    /// Returns an error if the registry client cannot be created.
    pub fn from_config(config: &Config) -> Result<Self, crate::Error> {
        let registry = RegistryClient::new(&config.registry_url)?;
        Ok(Self::new(
            registry,
            PackageCache::new(&config.cache_dir),
            config.install_root(),
        ))
    }

    #[must_use]
    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    #[must_use]
    pub fn cache(&self) -> &PackageCache {
        &self.cache
    }

    /// Install `spec` and, recursively, its dependencies.
    ///
    /// # Errors
    /// Returns the first resolution, cache, or link error, wrapped with the
    /// chain of packages that led to it. Dependencies after a failing one
    /// are not attempted.
    pub async fn install(&mut self, spec: &PackageSpec) -> Result<InstallReport, PkgError> {
        let mut report = InstallReport::default();
        self.install_into(spec.clone(), &mut report).await?;
        Ok(report)
    }

    fn install_into<'a>(
        &'a mut self,
        spec: PackageSpec,
        report: &'a mut InstallReport,
    ) -> BoxFuture<'a, Result<(), PkgError>> {
        Box::pin(async move {
            if !self.requested.insert(spec.clone()) {
                debug!(spec = %spec, "Already requested, skipping");
                return Ok(());
            }

            info!(spec = %spec, "Resolving");
            let resolution = self
                .registry
                .resolve(&spec)
                .await
                .map_err(|e| e.context(format!("resolve {spec}")))?;

            let pkg = ResolvedPackage::new(&spec.name, &resolution.version);
            if !self.resolved.insert(pkg.clone()) {
                // Seen via another selector or a cycle: the link still moves
                // to this version, but its subtree was already walked.
                let cache_path = self.cache.package_dir(&pkg.name, &pkg.version);
                if !cache_path.exists() {
                    debug!(package = %pkg, "Earlier attempt failed, not relinking");
                    return Ok(());
                }
                debug!(spec = %spec, package = %pkg, "Already installed in this run, relinking");
                return self.link(&pkg, cache_path, true, report);
            }

            let entry = self
                .cache
                .ensure_cached(self.registry.http(), &pkg, &resolution.tarball_url)
                .await
                .map_err(|e| e.context(format!("cache {pkg}")))?;

            self.link(&pkg, entry.path, entry.from_cache, report)?;

            for (dep_name, dep_selector) in resolution.dependencies {
                let dep = PackageSpec::new(dep_name, dep_selector);
                let ctx = format!("install dep {dep}");
                self.install_into(dep, report)
                    .await
                    .map_err(|e| e.context(ctx))?;
            }

            Ok(())
        })
    }

    fn link(
        &self,
        pkg: &ResolvedPackage,
        cache_path: PathBuf,
        from_cache: bool,
        report: &mut InstallReport,
    ) -> Result<(), PkgError> {
        let link_path = link_package(&self.install_root, &pkg.name, &cache_path)
            .map_err(|e| e.context(format!("link {pkg}")))?;
        info!(package = %pkg, link = %link_path.display(), "Linked");

        report.installed.push(InstalledPackage {
            name: pkg.name.clone(),
            version: pkg.version.clone(),
            link_path,
            cache_path,
            from_cache,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_package_identity() {
        let a = ResolvedPackage::new("left-pad", "1.3.0");
        let b = ResolvedPackage::new("left-pad".to_string(), "1.3.0".to_string());
        assert_eq!(a, b);
        assert_ne!(a, ResolvedPackage::new("left-pad", "1.3.1"));
        assert_eq!(a.to_string(), "left-pad@1.3.0");
    }

    #[test]
    fn test_report_counts() {
        let pkg = |from_cache| InstalledPackage {
            name: "x".to_string(),
            version: "1.0.0".to_string(),
            link_path: PathBuf::from("node_modules/x"),
            cache_path: PathBuf::from("/cache/x/1.0.0"),
            from_cache,
        };
        let report = InstallReport {
            installed: vec![pkg(true), pkg(false), pkg(false)],
        };
        assert_eq!(report.cached(), 1);
        assert_eq!(report.downloaded(), 2);
    }

    #[test]
    fn test_from_config_paths() {
        let config = Config::new(PathBuf::from("/work/app"))
            .with_cache_dir(PathBuf::from("/tmp/burrow-cache"));
        let installer = Installer::from_config(&config).unwrap();
        assert_eq!(
            installer.install_root(),
            Path::new("/work/app/node_modules")
        );
        assert_eq!(
            installer.cache().root(),
            Path::new("/tmp/burrow-cache/npm")
        );
    }
}
