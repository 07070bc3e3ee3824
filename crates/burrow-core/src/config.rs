use crate::error::Error;
use crate::paths;
use crate::pkg::registry::{DEFAULT_REGISTRY, REGISTRY_ENV};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Runtime configuration for the burrow CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project directory; packages are linked into `<cwd>/node_modules`.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,

    /// Registry base URL, always ending in `/`.
    pub registry_url: String,

    /// Root of the package cache.
    pub cache_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
            registry_url: DEFAULT_REGISTRY.to_string(),
            cache_dir: paths::cache_dir(),
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Create a config for `cwd`, reading `BURROW_NPM_REGISTRY` and
    /// `BURROW_CACHE_DIR` from the environment.
    ///
    /// # Errors
    /// Returns an error if the registry override is not a valid URL.
    pub fn from_env(cwd: PathBuf) -> Result<Self, Error> {
        let config = Self::new(cwd).with_cache_dir(paths::cache_dir_from_env());
        match std::env::var(REGISTRY_ENV) {
            Ok(url) if !url.is_empty() => config.with_registry_url(&url),
            _ => Ok(config),
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }

    /// Set the cache root.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: PathBuf) -> Self {
        self.cache_dir = dir;
        self
    }

    /// Set the registry URL.
    ///
    /// # Errors
    /// Returns an error if `url` cannot be parsed.
    pub fn with_registry_url(mut self, url: &str) -> Result<Self, Error> {
        let normalized = if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{url}/")
        };
        Url::parse(&normalized).map_err(|source| Error::InvalidRegistryUrl {
            url: url.to_string(),
            source,
        })?;
        self.registry_url = normalized;
        Ok(self)
    }

    /// Directory holding one link per installed package name.
    #[must_use]
    pub fn install_root(&self) -> PathBuf {
        paths::install_root(&self.cwd)
    }
}
