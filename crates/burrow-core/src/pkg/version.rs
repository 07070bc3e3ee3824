//! Version resolution using semver.

use super::error::PkgError;
use super::registry::RegistryMetadata;
use super::spec::PackageSpec;
use semver::{Version, VersionReq};
use std::collections::BTreeMap;

/// A selector resolved to one published version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Version string exactly as listed by the registry.
    pub version: String,
    /// Archive URL of that version.
    pub tarball_url: String,
    /// Declared dependencies (name to selector).
    pub dependencies: BTreeMap<String, String>,
}

/// Resolve a specifier's selector against registry metadata.
///
/// # Rules
/// - A selector naming a dist-tag is replaced by the tag's version
/// - A selector that is a key of `versions` resolves to that key
/// - Anything else is parsed as a range and resolves to the highest
///   satisfying version; keys that are not valid semver are ignored
/// - Supports OR ranges like `^1.0.0 || ^2.0.0`
///
/// # Errors
/// Returns an error if the selector is not a valid range or no version
/// satisfies it.
pub fn resolve_version(
    metadata: &RegistryMetadata,
    spec: &PackageSpec,
) -> Result<Resolution, PkgError> {
    let selector = metadata
        .dist_tags
        .get(&spec.selector)
        .map_or(spec.selector.as_str(), String::as_str);

    if metadata.versions.contains_key(selector) {
        return Ok(resolution_for(metadata, selector));
    }

    let reqs = parse_constraint(selector)?;

    let mut best: Option<(Version, &str)> = None;
    for key in metadata.versions.keys() {
        let Ok(version) = Version::parse(key) else {
            continue;
        };
        if !reqs.iter().any(|req| req.matches(&version)) {
            continue;
        }
        if best.as_ref().map_or(true, |(current, _)| version > *current) {
            best = Some((version, key.as_str()));
        }
    }

    match best {
        Some((_, key)) => Ok(resolution_for(metadata, key)),
        None => Err(PkgError::no_matching_version(&spec.name, selector)),
    }
}

fn resolution_for(metadata: &RegistryMetadata, key: &str) -> Resolution {
    let meta = &metadata.versions[key];
    Resolution {
        version: key.to_string(),
        tarball_url: meta.dist.tarball.clone(),
        dependencies: meta.dependencies.clone(),
    }
}

/// Parse a constraint into its `||` alternatives.
///
/// Every alternative must parse; one bad alternative makes the whole
/// constraint invalid.
fn parse_constraint(range: &str) -> Result<Vec<VersionReq>, PkgError> {
    range.split("||").map(str::trim).map(|alt| parse_range(range, alt)).collect()
}

/// Parse a single version range, handling npm-specific syntax.
///
/// Handles:
/// - Bare versions: 1.2.3 (exact, as npm treats them)
/// - Standard semver ranges: ^1.0.0, ~1.0.0, >=1.0.0, etc.
/// - Hyphen ranges: 1.0.0 - 2.0.0
/// - X-ranges: 1.x, 1.0.x, *
/// - Space-separated comparators: >= 2.1.2 < 3.0.0
fn parse_range(full: &str, range: &str) -> Result<VersionReq, PkgError> {
    let invalid = |e: semver::Error| PkgError::invalid_constraint(full, e);

    if Version::parse(range).is_ok() {
        return VersionReq::parse(&format!("={range}")).map_err(invalid);
    }

    // "1.0.0 - 2.0.0" -> ">=1.0.0, <=2.0.0"
    if let Some((start, end)) = parse_hyphen_range(range) {
        return VersionReq::parse(&format!(">={start}, <={end}")).map_err(invalid);
    }

    // "1.x" -> ">=1.0.0, <2.0.0"
    if range.contains('x') || range.contains('X') || range == "*" {
        let converted = convert_x_range(range).ok_or_else(|| {
            PkgError::invalid_constraint(full, "version component out of range")
        })?;
        return VersionReq::parse(&converted).map_err(invalid);
    }

    // ">= 2.1.2 < 3.0.0" -> ">=2.1.2, <3.0.0"
    VersionReq::parse(&convert_space_separated_comparators(range)).map_err(invalid)
}

fn parse_hyphen_range(range: &str) -> Option<(&str, &str)> {
    let (start, end) = range.split_once(" - ")?;
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() {
        return None;
    }
    Some((start, end))
}

/// Convert space-separated comparators to comma-separated.
///
/// npm allows `>= 2.1.2 < 3.0.0`, meaning `>=2.1.2 AND <3.0.0`; the
/// semver crate requires `>=2.1.2, <3.0.0`. An operator separated from
/// its version by a space is glued back onto it.
fn convert_space_separated_comparators(range: &str) -> String {
    let mut comparators: Vec<String> = Vec::new();
    let mut pending_op = String::new();

    for token in range.split_whitespace() {
        if token_has_version(token) {
            comparators.push(format!("{pending_op}{token}"));
            pending_op.clear();
        } else {
            pending_op.push_str(token);
        }
    }

    if !pending_op.is_empty() {
        comparators.push(pending_op);
    }

    if comparators.is_empty() {
        return range.to_string();
    }
    comparators.join(", ")
}

fn token_has_version(token: &str) -> bool {
    token.chars().any(|c| c.is_ascii_digit())
}

/// Expand an x-range into explicit bounds. `None` if the upper bound
/// does not fit in a `u64`.
fn convert_x_range(range: &str) -> Option<String> {
    if range == "*" || range == "x" || range == "X" {
        return Some(">=0.0.0".to_string());
    }

    let parts: Vec<&str> = range.split('.').collect();

    match parts.as_slice() {
        [major, "x" | "X" | "*"] | [major, "x" | "X" | "*", "x" | "X" | "*"] => {
            if let Ok(m) = major.parse::<u64>() {
                return Some(format!(">={m}.0.0, <{}.0.0", m.checked_add(1)?));
            }
        }
        [major, minor, "x" | "X" | "*"] => {
            if let (Ok(m), Ok(n)) = (major.parse::<u64>(), minor.parse::<u64>()) {
                return Some(format!(">={m}.{n}.0, <{m}.{}.0", n.checked_add(1)?));
            }
        }
        _ => {}
    }

    // Leave anything else to the semver parser, which rejects it.
    Some(range.to_string())
}
