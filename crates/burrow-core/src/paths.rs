use crate::version::SCHEMA_VERSION;
use std::path::{Path, PathBuf};

/// Environment variable to override the cache root (used by tests and CI).
pub const CACHE_DIR_ENV: &str = "BURROW_CACHE_DIR";

/// Name of the project-local install directory.
pub const INSTALL_DIR: &str = "node_modules";

/// Get the cache directory for burrow.
///
/// Uses platform-appropriate locations with versioning:
/// - Linux: `$XDG_CACHE_HOME/burrow/v{N}` or `~/.cache/burrow/v{N}`
/// - macOS: `~/Library/Caches/burrow/v{N}`
/// - Windows: `%LOCALAPPDATA%\burrow\v{N}`
#[must_use]
pub fn cache_dir() -> PathBuf {
    let base = dirs_next::cache_dir().map_or_else(
        || {
            dirs_next::home_dir().map_or_else(
                || PathBuf::from(".burrow-cache"),
                |p| p.join(".cache").join("burrow"),
            )
        },
        |p| p.join("burrow"),
    );

    base.join(format!("v{SCHEMA_VERSION}"))
}

/// Cache directory, honouring `BURROW_CACHE_DIR` when set.
#[must_use]
pub fn cache_dir_from_env() -> PathBuf {
    match std::env::var_os(CACHE_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => cache_dir(),
    }
}

/// The install root for a project directory.
#[must_use]
pub fn install_root(cwd: &Path) -> PathBuf {
    cwd.join(INSTALL_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cache_dir_contains_version() {
        let dir = cache_dir();
        let dir_str = dir.to_string_lossy();
        assert!(dir_str.contains(&format!("v{SCHEMA_VERSION}")));
        assert!(dir_str.contains("burrow"));
    }

    #[test]
    #[serial]
    fn test_cache_dir_env_override() {
        std::env::set_var(CACHE_DIR_ENV, "/tmp/burrow-test-cache");
        assert_eq!(
            cache_dir_from_env(),
            PathBuf::from("/tmp/burrow-test-cache")
        );

        std::env::remove_var(CACHE_DIR_ENV);
        assert_eq!(cache_dir_from_env(), cache_dir());
    }

    #[test]
    fn test_install_root() {
        let root = install_root(Path::new("/work/app"));
        assert_eq!(root, Path::new("/work/app").join("node_modules"));
    }
}
