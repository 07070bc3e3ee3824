//! Package manager error types.

use std::fmt;

/// Package manager error codes.
pub mod codes {
    // Specifier parsing
    pub const PKG_SPEC_EMPTY: &str = "PKG_SPEC_EMPTY";
    pub const PKG_SPEC_EMPTY_NAME: &str = "PKG_SPEC_EMPTY_NAME";
    pub const PKG_SPEC_INVALID_SCOPED: &str = "PKG_SPEC_INVALID_SCOPED";
    pub const PKG_SPEC_INVALID_SCOPED_NAME: &str = "PKG_SPEC_INVALID_SCOPED_NAME";
    pub const PKG_SPEC_WHITESPACE: &str = "PKG_SPEC_WHITESPACE";

    // Registry
    pub const PKG_METADATA_FETCH: &str = "PKG_METADATA_FETCH";
    pub const PKG_UNEXPECTED_STATUS: &str = "PKG_UNEXPECTED_STATUS";
    pub const PKG_METADATA_DECODE: &str = "PKG_METADATA_DECODE";

    // Resolution
    pub const PKG_INVALID_CONSTRAINT: &str = "PKG_INVALID_CONSTRAINT";
    pub const PKG_NO_MATCHING_VERSION: &str = "PKG_NO_MATCHING_VERSION";

    // Cache population
    pub const PKG_ARCHIVE_FETCH: &str = "PKG_ARCHIVE_FETCH";
    pub const PKG_DECOMPRESSION: &str = "PKG_DECOMPRESSION";
    pub const PKG_EXTRACT_FAILED: &str = "PKG_EXTRACT_FAILED";
    pub const PKG_CACHE_ERROR: &str = "PKG_CACHE_ERROR";

    // Linking
    pub const PKG_LINK_FAILED: &str = "PKG_LINK_FAILED";

    /// Codes produced by the specifier parser.
    pub const SPEC_CODES: [&str; 5] = [
        PKG_SPEC_EMPTY,
        PKG_SPEC_EMPTY_NAME,
        PKG_SPEC_INVALID_SCOPED,
        PKG_SPEC_INVALID_SCOPED_NAME,
        PKG_SPEC_WHITESPACE,
    ];
}

/// Package manager error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgError {
    code: &'static str,
    message: String,
}

impl PkgError {
    /// Create a new error with the given code and message.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prefix the message with `ctx`, keeping the code.
    #[must_use]
    pub fn context(self, ctx: impl fmt::Display) -> Self {
        Self {
            code: self.code,
            message: format!("{ctx}: {}", self.message),
        }
    }

    /// Whether this error came from specifier parsing.
    #[must_use]
    pub fn is_spec_error(&self) -> bool {
        codes::SPEC_CODES.contains(&self.code)
    }

    pub fn metadata_fetch(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_METADATA_FETCH, msg)
    }

    /// Create an unexpected status error.
    #[must_use]
    pub fn unexpected_status(name: &str, status: reqwest::StatusCode) -> Self {
        Self::new(
            codes::PKG_UNEXPECTED_STATUS,
            format!("Registry returned status {status} for '{name}'"),
        )
    }

    pub fn metadata_decode(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_METADATA_DECODE, msg)
    }

    /// Create an invalid constraint error.
    #[must_use]
    pub fn invalid_constraint(range: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            codes::PKG_INVALID_CONSTRAINT,
            format!("Invalid version constraint '{range}': {reason}"),
        )
    }

    /// Create a no matching version error.
    #[must_use]
    pub fn no_matching_version(name: &str, range: &str) -> Self {
        Self::new(
            codes::PKG_NO_MATCHING_VERSION,
            format!("No version of {name} satisfies range: {range}"),
        )
    }

    pub fn archive_fetch(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_ARCHIVE_FETCH, msg)
    }

    pub fn decompression(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_DECOMPRESSION, msg)
    }

    /// Create an extraction failed error.
    pub fn extract_failed(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_EXTRACT_FAILED, msg)
    }

    /// Create a link failed error.
    pub fn link_failed(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_LINK_FAILED, msg)
    }

    /// Create a cache error.
    pub fn cache_error(msg: impl Into<String>) -> Self {
        Self::new(codes::PKG_CACHE_ERROR, msg)
    }
}

impl fmt::Display for PkgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PkgError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        let err = PkgError::link_failed("no permission");
        assert_eq!(err.code(), codes::PKG_LINK_FAILED);
        assert!(err.to_string().contains(codes::PKG_LINK_FAILED));
        assert!(err.to_string().contains("no permission"));
    }

    #[test]
    fn test_context_keeps_code() {
        let err = PkgError::no_matching_version("left-pad", "^9")
            .context("resolve left-pad@^9")
            .context("install dep left-pad@^9");

        assert_eq!(err.code(), codes::PKG_NO_MATCHING_VERSION);
        assert_eq!(
            err.message(),
            "install dep left-pad@^9: resolve left-pad@^9: No version of left-pad satisfies range: ^9"
        );
    }

    #[test]
    fn test_is_spec_error() {
        assert!(PkgError::new(codes::PKG_SPEC_WHITESPACE, "x").is_spec_error());
        assert!(!PkgError::archive_fetch("x").is_spec_error());
    }

    #[test]
    fn test_error_codes_uppercase() {
        let all_codes = [
            codes::PKG_SPEC_EMPTY,
            codes::PKG_SPEC_EMPTY_NAME,
            codes::PKG_SPEC_INVALID_SCOPED,
            codes::PKG_SPEC_INVALID_SCOPED_NAME,
            codes::PKG_SPEC_WHITESPACE,
            codes::PKG_METADATA_FETCH,
            codes::PKG_UNEXPECTED_STATUS,
            codes::PKG_METADATA_DECODE,
            codes::PKG_INVALID_CONSTRAINT,
            codes::PKG_NO_MATCHING_VERSION,
            codes::PKG_ARCHIVE_FETCH,
            codes::PKG_DECOMPRESSION,
            codes::PKG_EXTRACT_FAILED,
            codes::PKG_CACHE_ERROR,
            codes::PKG_LINK_FAILED,
        ];

        for code in all_codes {
            assert!(
                code.chars().all(|c| c.is_uppercase() || c == '_'),
                "Error code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }
}
