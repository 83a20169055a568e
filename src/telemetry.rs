//! Logging initialization for binaries.

/// Environment variable that overrides the log filter
pub const LOG_ENV: &str = "PINCH_DRAW_LOG";

/// Initialize `env_logger`.
///
/// The filter comes from `PINCH_DRAW_LOG`, then `RUST_LOG`, then
/// `default_level`. Calling this more than once is harmless.
pub fn init_logging(default_level: &str) {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    let _ = env_logger::Builder::new()
        .parse_filters(&filter)
        .format_timestamp_millis()
        .try_init();
}
