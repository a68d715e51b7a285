//! Process-wide structured logging bootstrap.
//!
//! A single `tracing-subscriber` registry, initialized once from `main`.
//! Components log through bracketed subsystem tags (`"[SNAPSHOT]"`,
//! `"[SYNC]"`, `"[WATCH]"`, `"[SEARCH]"`) rather than per-module targets, so
//! grepping a log stream for a subsystem doesn't require knowing its crate
//! path.

use codelens_domain::error::{Error, Result};
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

/// Initialize the global tracing subscriber. Must be called at most once;
/// a second call returns `Ok(())` without installing a new one (matches
/// `tracing`'s own "already set" semantics, swallowed here since both the
/// `serve` and `config check` bootstrap paths call this unconditionally).
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_log_level(&config.level)?;
    let filter = EnvFilter::try_from_env("CODELENS_LOG").unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    if result.is_err() {
        tracing::debug!("[LOGGING] subscriber already initialized, skipping");
    }

    tracing::info!(level = %level, json = config.json, "[LOGGING] logging initialized");
    Ok(())
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(Error::config(format!(
            "invalid log level '{other}': expected trace, debug, info, warn, or error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        assert!(parse_log_level("verbose").is_err());
    }

    #[test]
    fn accepts_known_levels() {
        assert!(parse_log_level("DEBUG").is_ok());
        assert!(parse_log_level("warning").is_ok());
    }
}
