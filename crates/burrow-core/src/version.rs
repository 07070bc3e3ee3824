/// The current version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Schema version for the cache layout.
/// Bump this when changing the on-disk layout of cache entries.
pub const SCHEMA_VERSION: u32 = 1;

/// User agent sent with every registry and archive request.
#[must_use]
pub fn user_agent() -> String {
    format!("burrow/{VERSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_not_empty() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_user_agent_contains_version() {
        let ua = user_agent();
        assert!(ua.starts_with("burrow/"));
        assert!(ua.ends_with(VERSION));
    }

    #[test]
    fn test_schema_version_positive() {
        const { assert!(SCHEMA_VERSION > 0) };
    }
}
