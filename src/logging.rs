//! Structured Logging for zDrop
//!
//! Initializes the tracing subscriber once at startup:
//! - JSON output for log aggregation in production
//! - pretty output for development
//! - `RUST_LOG`-style filtering via `EnvFilter`
//!
//! Distributor events are emitted under the `zdrop::events` target; the
//! lifecycle controller logs under `zdrop::distributor`.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to initialize logging: {0}")]
    Init(String),
}

/// Application log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" | "warning" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Initialize logging. `json` selects machine-readable output.
///
/// Safe to call more than once; later calls are no-ops (matters for tests).
pub fn init_logging(level: LogLevel, json: bool) -> Result<(), LoggingError> {
    let level: Level = level.into();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("zdrop={},info", level)));

    let result = if json {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .try_init()
    } else {
        fmt().with_env_filter(filter).try_init()
    };

    // A second init attempt reports an error from the global registry;
    // treat it as already-initialized rather than failing startup.
    if result.is_err() {
        tracing::debug!("logging already initialized");
    }
    Ok(())
}
