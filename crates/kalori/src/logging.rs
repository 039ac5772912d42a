//! Logging setup
//!
//! Logs go to stderr so the views on stdout stay readable.
//! Precedence: `--verbose`, then `$RUST_LOG`, then `[log].level`.

use tracing_subscriber::EnvFilter;

/// Pick the filter directive for this run
pub fn filter_directive(config_level: &str, verbose: bool, rust_log: Option<&str>) -> String {
    if verbose {
        return "debug".to_string();
    }
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive.to_string(),
        _ => config_level.to_string(),
    }
}

/// Install the global subscriber
pub fn init(config_level: &str, verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = filter_directive(config_level, verbose, rust_log.as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
