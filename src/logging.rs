//! `tracing`/`tracing-subscriber` setup for the CLI entry point.

use tracing_subscriber::EnvFilter;

/// Installs a global subscriber. `level` is a `tracing` directive
/// (`trace`, `debug`, `info`, `warn`, `error`, or a full `EnvFilter`
/// spec); falls back to `info` when it doesn't parse. `RUST_LOG`, if
/// set, takes precedence.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
