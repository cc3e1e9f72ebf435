//! Tracing setup for the binary.
//!
//! Diagnostics go to stderr so they never mix with anything a command prints
//! to stdout (completion scripts in particular). User-facing messages are
//! printed through [`crate::output`] and are not affected by the filter.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "TREESNAP_LOG";

/// Filter used when neither `TREESNAP_LOG` nor `RUST_LOG` is set
#[must_use]
pub const fn default_directive(verbose: bool) -> &'static str {
    if verbose { "treesnap=debug" } else { "warn" }
}

/// Build the filter from the environment, falling back to the defaults
#[must_use]
pub fn filter(verbose: bool) -> EnvFilter {
    std::env::var(LOG_ENV)
        .ok()
        .or_else(|| std::env::var(EnvFilter::DEFAULT_ENV).ok())
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
