//! Diagnostic logging setup.
//!
//! All diagnostics go to stderr so stdout carries only the agent's answer.
//! `CLINK_LOG` takes an `EnvFilter` directive and overrides `-v`.

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a filter directive, e.g. `clink=trace`.
pub const LOG_ENV_VAR: &str = "CLINK_LOG";

/// Filter directive for a `-v` count.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,clink=debug",
        _ => "debug",
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_directive(0), "warn");
        assert_eq!(default_directive(1), "warn,clink=debug");
        assert_eq!(default_directive(5), "debug");
    }

    #[test]
    fn directives_parse() {
        for v in 0..3 {
            assert!(default_directive(v).parse::<EnvFilter>().is_ok());
        }
    }
}
