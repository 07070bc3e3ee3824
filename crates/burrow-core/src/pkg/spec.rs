//! Package specifier parsing.
//!
//! Parses command-line specifiers like:
//! - `react`
//! - `react@18.2.0`
//! - `react@^18.0.0`
//! - `react@next`
//! - `@types/node`
//! - `@types/node@^20`

use super::error::{codes, PkgError};
use std::fmt;

/// Selector used when a specifier names no version.
pub const LATEST: &str = "latest";

/// A parsed package specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageSpec {
    /// Full package name (e.g., "@scope/name" or "name").
    pub name: String,
    /// Dist-tag, exact version, or semver range.
    pub selector: String,
}

impl PackageSpec {
    /// Build a specifier from already separated parts.
    #[must_use]
    pub fn new(name: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            selector: selector.into(),
        }
    }

    /// Parse a package specifier string.
    ///
    /// The selector after `@` is taken verbatim; it is validated later,
    /// against the registry metadata.
    ///
    /// # Errors
    /// Returns an error if the specifier is malformed.
    pub fn parse(input: &str) -> Result<Self, PkgError> {
        if input.is_empty() {
            return Err(PkgError::new(
                codes::PKG_SPEC_EMPTY,
                "Package name cannot be empty",
            ));
        }

        if input.starts_with('@') {
            Self::parse_scoped(input)
        } else if let Some((name, selector)) = input.split_once('@') {
            if name.is_empty() {
                return Err(PkgError::new(
                    codes::PKG_SPEC_EMPTY_NAME,
                    format!("Package name cannot be empty before '@' in '{input}'"),
                ));
            }
            Ok(Self::new(name, selector))
        } else {
            if input.contains(' ') {
                return Err(PkgError::new(
                    codes::PKG_SPEC_WHITESPACE,
                    format!("Package name cannot contain spaces: '{input}'"),
                ));
            }
            Ok(Self::new(input, LATEST))
        }
    }

    fn parse_scoped(input: &str) -> Result<Self, PkgError> {
        // The leading '@' marks the scope; a later one starts the selector.
        match input.rfind('@') {
            Some(at_pos) if at_pos > 0 => {
                let name = &input[..at_pos];
                if name.is_empty() {
                    return Err(PkgError::new(
                        codes::PKG_SPEC_INVALID_SCOPED,
                        format!("Invalid scoped package: '{input}'"),
                    ));
                }
                Ok(Self::new(name, &input[at_pos + 1..]))
            }
            _ => {
                if !input.contains('/') {
                    return Err(PkgError::new(
                        codes::PKG_SPEC_INVALID_SCOPED_NAME,
                        format!("Invalid scoped package name: missing '/' in '{input}'"),
                    ));
                }
                Ok(Self::new(input, LATEST))
            }
        }
    }

    /// Check if this is a scoped package.
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        self.name.starts_with('@')
    }

    /// URL-encode the package name for registry requests.
    ///
    /// For scoped packages, encodes the `/` as `%2F`.
    #[must_use]
    pub fn url_encoded_name(&self) -> String {
        if self.is_scoped() {
            self.name.replace('/', "%2F")
        } else {
            self.name.clone()
        }
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_code(input: &str) -> &'static str {
        PackageSpec::parse(input).unwrap_err().code()
    }

    #[test]
    fn test_parse_simple() {
        let spec = PackageSpec::parse("foo").unwrap();
        assert_eq!(spec, PackageSpec::new("foo", "latest"));
    }

    #[test]
    fn test_parse_with_version() {
        let spec = PackageSpec::parse("foo@1.2.3").unwrap();
        assert_eq!(spec, PackageSpec::new("foo", "1.2.3"));
    }

    #[test]
    fn test_parse_with_range_and_tag() {
        assert_eq!(
            PackageSpec::parse("react@^18.0.0").unwrap().selector,
            "^18.0.0"
        );
        assert_eq!(PackageSpec::parse("react@next").unwrap().selector, "next");
    }

    #[test]
    fn test_parse_selector_kept_verbatim() {
        // Only the first '@' splits an unscoped specifier.
        let spec = PackageSpec::parse("foo@npm:bar@1/x").unwrap();
        assert_eq!(spec.name, "foo");
        assert_eq!(spec.selector, "npm:bar@1/x");

        let spec = PackageSpec::parse("foo@").unwrap();
        assert_eq!(spec.selector, "");
    }

    #[test]
    fn test_parse_scoped() {
        let spec = PackageSpec::parse("@scope/pkg").unwrap();
        assert_eq!(spec, PackageSpec::new("@scope/pkg", "latest"));
    }

    #[test]
    fn test_parse_scoped_with_version() {
        let spec = PackageSpec::parse("@scope/pkg@2.0.0").unwrap();
        assert_eq!(spec, PackageSpec::new("@scope/pkg", "2.0.0"));
    }

    #[test]
    fn test_parse_scoped_splits_on_last_at() {
        let spec = PackageSpec::parse("@scope/pkg@tag@x").unwrap();
        assert_eq!(spec.name, "@scope/pkg@tag");
        assert_eq!(spec.selector, "x");
    }

    #[test]
    fn test_parse_scoped_without_slash_but_with_version() {
        // The name is not re-validated once a version suffix is present.
        let spec = PackageSpec::parse("@scope@1.0.0").unwrap();
        assert_eq!(spec, PackageSpec::new("@scope", "1.0.0"));
    }

    #[test]
    fn test_parse_empty_fails() {
        assert_eq!(parse_code(""), codes::PKG_SPEC_EMPTY);
    }

    #[test]
    fn test_parse_bare_at_fails() {
        assert_eq!(parse_code("@"), codes::PKG_SPEC_INVALID_SCOPED_NAME);
    }

    #[test]
    fn test_parse_scope_only_fails() {
        assert_eq!(parse_code("@scope"), codes::PKG_SPEC_INVALID_SCOPED_NAME);
        assert_eq!(parse_code("@foo"), codes::PKG_SPEC_INVALID_SCOPED_NAME);
    }

    #[test]
    fn test_parse_whitespace_fails() {
        assert_eq!(parse_code("foo bar"), codes::PKG_SPEC_WHITESPACE);
        assert!(PackageSpec::parse("foo bar").unwrap_err().is_spec_error());
    }

    #[test]
    fn test_url_encoded_name() {
        let spec = PackageSpec::parse("react").unwrap();
        assert_eq!(spec.url_encoded_name(), "react");

        let spec = PackageSpec::parse("@types/node").unwrap();
        assert_eq!(spec.url_encoded_name(), "@types%2Fnode");
    }

    #[test]
    fn test_is_scoped() {
        assert!(!PackageSpec::parse("react").unwrap().is_scoped());
        assert!(PackageSpec::parse("@types/node").unwrap().is_scoped());
    }

    #[test]
    fn test_display() {
        let spec = PackageSpec::parse("@types/node@^20").unwrap();
        assert_eq!(spec.to_string(), "@types/node@^20");
    }
}
