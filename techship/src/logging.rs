//! Tracing subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the level is `debug`
/// with `verbose` and `warn` without (lookup results go to stdout, so the
/// default keeps stderr quiet).
pub fn init(verbose: bool) {
    let default_level = if verbose { "techship=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
