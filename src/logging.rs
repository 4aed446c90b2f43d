//! Logging setup
//!
//! Library code logs through `tracing` macros; the binary installs a
//! `tracing-subscriber` formatter writing to stderr so stdout stays usable
//! in pipes.

use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter (falls back to `RUST_LOG`)
pub const LOG_ENV: &str = "COSTBOOK_LOG";

/// Filter used when neither the environment nor `--verbose` says otherwise
fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "costbook=debug"
    } else {
        "warn"
    }
}

/// Build the log filter
///
/// `COSTBOOK_LOG` wins over `RUST_LOG`. `--verbose` only applies when
/// neither variable is set.
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Initialize logging for the CLI
pub fn init(verbose: bool) {
    let _ = fmt()
        .with_env_filter(filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_line_number(verbose)
        .without_time()
        .try_init();
}
