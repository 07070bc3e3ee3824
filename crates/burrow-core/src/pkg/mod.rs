//! Package manager functionality.
//!
//! Provides utilities for:
//! - Parsing package specifiers (name@selector)
//! - Fetching package metadata from an npm registry
//! - Resolving dist-tags and version ranges using semver
//! - Downloading and extracting tarballs into the package cache
//! - Creating symlinks/junctions in `node_modules`
//! - Installing packages and their dependencies recursively

pub mod cache;
pub mod error;
pub mod install;
pub mod link;
pub mod registry;
pub mod spec;
pub mod tarball;
pub mod version;

pub use cache::{CacheEntry, PackageCache};
pub use error::{codes as pkg_codes, PkgError};
pub use install::{InstallReport, InstalledPackage, Installer, ResolvedPackage};
pub use link::{link_package, link_path};
pub use registry::{RegistryClient, RegistryMetadata, DEFAULT_REGISTRY, REGISTRY_ENV};
pub use spec::PackageSpec;
pub use tarball::{download_tarball, extract_tgz_atomic, MAX_TARBALL_SIZE};
pub use version::{resolve_version, Resolution};
