use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Map the `-v` count onto a default level.
pub fn level_for(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Filter built from `rust_log` when it holds any directives, otherwise from
/// the `-v` level.
pub fn filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level_for(verbose).into())
        .parse_lossy(rust_log.unwrap_or_default())
}

/// Install the global subscriber. Output goes to stderr; stdout is kept for
/// payload and version output.
pub fn init(verbose: u8) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
