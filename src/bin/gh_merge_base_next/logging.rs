//! Log setup. stdout carries the result so everything here goes to stderr.
use std::{env, io};

use tracing_subscriber::{filter::EnvFilter, prelude::*};

fn default_level(verbose: u8) -> &'static str {
    let runner_debug = env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1");
    match verbose {
        0 if runner_debug => "debug",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `RUST_LOG` when set, otherwise a level picked from `-v`.
pub fn setup_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    let stderr_log = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(verbose > 1)
        .with_writer(io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(stderr_log).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        env::remove_var("RUNNER_DEBUG");
        assert_eq!(default_level(0), "warn");
        assert_eq!(default_level(1), "info");
        assert_eq!(default_level(2), "debug");
        assert_eq!(default_level(5), "trace");
    }
}
