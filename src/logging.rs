//! Logging setup for the binaries
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the process entry point.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global fmt subscriber
///
/// Filter precedence: `RUST_LOG`, then `DT_LOG_LEVEL`
/// (debug/info/warn/error), then `default_directive`.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| level_from_env().map(EnvFilter::new))
        .unwrap_or_else(|| EnvFilter::new(default_directive));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

fn level_from_env() -> Option<&'static str> {
    let level = std::env::var("DT_LOG_LEVEL").ok()?;
    parse_level(&level)
}

/// Map a `DT_LOG_LEVEL` value to a filter directive; unknown values are ignored
pub fn parse_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "fatal" | "panic" => Some("error"),
        _ => None,
    }
}
