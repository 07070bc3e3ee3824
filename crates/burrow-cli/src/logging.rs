//! Logging initialization for the CLI.
//!
//! The core library only emits `tracing` events; the binary decides where
//! they go. Everything is written to stderr so stdout carries only the
//! install report.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Targets whose level follows `-v`.
const OWN_TARGETS: [&str; 2] = ["burrow", "burrow_core"];

fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// `RUST_LOG` if set, `warn` otherwise, with burrow's own targets raised
/// to the `-v` level.
fn env_filter(level: Level) -> EnvFilter {
    OWN_TARGETS.iter().fold(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        |filter, target| filter.add_directive(format!("{target}={level}").parse().unwrap()),
    )
}

/// Install the global subscriber.
///
/// With `json`, each event is one JSON object per line, e.g.
/// `{"timestamp":"...","level":"INFO","fields":{"message":"Linked","package":"leftpad@1.0.0"},"target":"burrow_core::pkg::install"}`.
///
/// # Panics
/// Panics if a global subscriber is already set.
pub fn init(verbosity: u8, json: bool) {
    let registry = tracing_subscriber::registry().with(env_filter(level_for(verbosity)));

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), Level::INFO);
        assert_eq!(level_for(1), Level::DEBUG);
        assert_eq!(level_for(2), Level::TRACE);
        assert_eq!(level_for(9), Level::TRACE);
    }

    #[test]
    fn test_filter_names_own_targets() {
        let rendered = env_filter(Level::DEBUG).to_string();
        assert!(rendered.contains("burrow=debug"), "{rendered}");
        assert!(rendered.contains("burrow_core=debug"), "{rendered}");
    }
}
