//! npm registry client.

use super::error::PkgError;
use super::spec::PackageSpec;
use super::version::{resolve_version, Resolution};
use crate::version::user_agent;
use reqwest::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default npm registry URL.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Environment variable to override registry URL.
pub const REGISTRY_ENV: &str = "BURROW_NPM_REGISTRY";

/// Per-package registry document (the "packument").
///
/// Only the fields the installer reads are modelled; everything else the
/// registry sends is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryMetadata {
    /// Dist-tag name to version string.
    #[serde(rename = "dist-tags", default)]
    pub dist_tags: HashMap<String, String>,
    /// Version string to per-version metadata.
    #[serde(default)]
    pub versions: HashMap<String, VersionMetadata>,
}

/// Metadata of one published version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionMetadata {
    pub dist: Dist,
    /// Dependency name to selector.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dist {
    /// Archive URL.
    pub tarball: String,
}

/// Registry client for fetching package metadata.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: Url,
    http: Client,
}

impl RegistryClient {
    /// Create a new registry client with the given base URL.
    ///
    /// A trailing `/` is added to `base_url` if missing so that package
    /// names are joined under it rather than replacing its last segment.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the HTTP client cannot be created.
    pub fn new(base_url: &str) -> Result<Self, PkgError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized).map_err(|e| {
            PkgError::metadata_fetch(format!("Invalid registry URL '{base_url}': {e}"))
        })?;

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .user_agent(user_agent())
            .build()
            .map_err(|e| PkgError::metadata_fetch(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the HTTP client (for reuse in tarball downloads).
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// URL of the metadata document for `spec`'s package.
    ///
    /// # Errors
    /// Returns an error if the encoded name does not form a valid URL.
    pub fn metadata_url(&self, spec: &PackageSpec) -> Result<Url, PkgError> {
        self.base_url.join(&spec.url_encoded_name()).map_err(|e| {
            PkgError::metadata_fetch(format!("Failed to build URL for '{}': {e}", spec.name))
        })
    }

    /// Fetch and decode the metadata document for a package.
    ///
    /// # Errors
    /// Returns an error if the request fails, the registry answers with a
    /// non-success status, or the body is not a metadata document.
    pub async fn fetch_metadata(&self, spec: &PackageSpec) -> Result<RegistryMetadata, PkgError> {
        let url = self.metadata_url(spec)?;
        debug!(name = %spec.name, url = %url, "Fetching registry metadata");

        let response = self.http.get(url.as_str()).send().await.map_err(|e| {
            PkgError::metadata_fetch(format!("Failed to fetch metadata for '{}': {e}", spec.name))
        })?;

        if !response.status().is_success() {
            return Err(PkgError::unexpected_status(&spec.name, response.status()));
        }

        let body = response.bytes().await.map_err(|e| {
            PkgError::metadata_fetch(format!("Failed to read metadata for '{}': {e}", spec.name))
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            PkgError::metadata_decode(format!("Invalid metadata for '{}': {e}", spec.name))
        })
    }

    /// Fetch metadata and resolve `spec.selector` to one concrete version.
    ///
    /// # Errors
    /// Returns any fetch, decode, or resolution error.
    pub async fn resolve(&self, spec: &PackageSpec) -> Result<Resolution, PkgError> {
        let metadata = self.fetch_metadata(spec).await?;
        resolve_version(&metadata, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_metadata() {
        let body = serde_json::json!({
            "name": "react",
            "dist-tags": { "latest": "18.2.0", "next": "19.0.0-rc.0" },
            "versions": {
                "18.2.0": {
                    "name": "react",
                    "dist": {
                        "tarball": "https://registry.npmjs.org/react/-/react-18.2.0.tgz",
                        "shasum": "abc123"
                    },
                    "dependencies": { "loose-envify": "^1.1.0" }
                }
            }
        });

        let meta: RegistryMetadata = serde_json::from_value(body).unwrap();
        assert_eq!(meta.dist_tags["latest"], "18.2.0");
        let v = &meta.versions["18.2.0"];
        assert_eq!(
            v.dist.tarball,
            "https://registry.npmjs.org/react/-/react-18.2.0.tgz"
        );
        assert_eq!(v.dependencies["loose-envify"], "^1.1.0");
    }

    #[test]
    fn test_decode_metadata_defaults() {
        let meta: RegistryMetadata = serde_json::from_str(
            r#"{"versions": {"1.0.0": {"dist": {"tarball": "u"}}}}"#,
        )
        .unwrap();
        assert!(meta.dist_tags.is_empty());
        assert!(meta.versions["1.0.0"].dependencies.is_empty());
    }

    #[test]
    fn test_decode_metadata_wrong_shape() {
        let result: Result<RegistryMetadata, _> =
            serde_json::from_str(r#"{"versions": {"1.0.0": {"dist": 5}}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_metadata_url_scoped() {
        let client = RegistryClient::new("http://127.0.0.1:4873").unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:4873/");

        let url = client
            .metadata_url(&PackageSpec::new("@types/node", "latest"))
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4873/@types%2Fnode");

        let url = client
            .metadata_url(&PackageSpec::new("react", "latest"))
            .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:4873/react");
    }

    #[test]
    fn test_client_creation() {
        let client = RegistryClient::new(DEFAULT_REGISTRY);
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_invalid_url() {
        let client = RegistryClient::new("not-a-url");
        assert!(client.is_err());
    }
}
