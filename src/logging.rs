use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PAW_LOG";

/// Human-readable logs on stderr, filtered by `PAW_LOG` (default `info`).
///
/// Stdout is left to command output and chat replies.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Same as [`init_tracing`] with an explicit filter, e.g. `debug` for `--verbose`.
pub fn init_tracing_with_filter(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
