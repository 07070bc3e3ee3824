use thiserror::Error;

/// Core error type for burrow startup and configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid registry URL '{url}': {source}")]
    InvalidRegistryUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Other(String),
}

impl From<crate::pkg::PkgError> for Error {
    fn from(e: crate::pkg::PkgError) -> Self {
        Self::Other(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::PkgError;

    #[test]
    fn test_pkg_error_keeps_code_in_message() {
        let err: Error = PkgError::metadata_fetch("connection refused").into();
        assert_eq!(err.to_string(), "PKG_METADATA_FETCH: connection refused");
    }
}
