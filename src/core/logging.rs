//! Centralized logging configuration for tread_link
//!
//! Structured logging using the `tracing` crate with:
//! - JSON formatted output by default
//! - Pretty-print format for development (`LOG_FORMAT=pretty`)
//! - Log levels via `RUST_LOG`
//! - Sanitization helpers for keys, secrets and signatures
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RUST_LOG` | `tread_link=info` | Log level filter (standard tracing format) |
//! | `LOG_FORMAT` | `json` | Output format: `json` or `pretty` |
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use tread_link::core::logging::{init_logging, SanitizedValue};
//!
//! init_logging();
//! tracing::info!(api_secret = %SanitizedValue::new(&secret), "Credential issued");
//! ```

use std::env;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_subscriber::{fmt as ts_fmt, fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Flag to track if logging has been initialized (prevents double-init)
static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Default log level when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "tread_link=info";

/// Wrapper for sensitive data that should be redacted in logs.
///
/// Values longer than 8 characters show their first 4 characters followed
/// by `...REDACTED`; shorter values are fully redacted.
#[derive(Clone)]
pub struct SanitizedValue<'a>(&'a str);

impl<'a> SanitizedValue<'a> {
    pub fn new(value: &'a str) -> Self {
        Self(value)
    }
}

impl<'a> fmt::Display for SanitizedValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.chars().count() > 8 {
            write!(f, "{}...REDACTED", prefix(self.0, 4))
        } else {
            write!(f, "REDACTED")
        }
    }
}

impl<'a> fmt::Debug for SanitizedValue<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SanitizedValue(***)")
    }
}

/// Shorthand for `SanitizedValue::new(value)`.
pub fn sanitize(value: &str) -> SanitizedValue<'_> {
    SanitizedValue::new(value)
}

/// First `n` characters of `value`; counted in chars, never bytes.
fn prefix(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}

/// Sanitize a signature by showing only the first 8 characters.
pub fn sanitize_signature(sig: &str) -> String {
    if sig.chars().count() > 12 {
        format!("{}...", prefix(sig, 8))
    } else {
        "REDACTED".to_string()
    }
}

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter string (e.g., "tread_link=debug")
    pub level_filter: String,
    /// Use pretty format instead of JSON
    pub use_pretty_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level_filter: DEFAULT_LOG_LEVEL.to_string(),
            use_pretty_format: false,
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG` and `LOG_FORMAT`.
    pub fn from_env() -> Self {
        let level_filter = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let use_pretty_format = env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "pretty")
            .unwrap_or(false);

        Self {
            level_filter,
            use_pretty_format,
        }
    }
}

/// Initialize the logging system from environment variables.
///
/// Subsequent calls are no-ops.
pub fn init_logging() {
    init_logging_with_config(LoggingConfig::from_env());
}

/// Initialize the logging system with a specific configuration.
pub fn init_logging_with_config(config: LoggingConfig) {
    if LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let env_filter = EnvFilter::try_new(&config.level_filter)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    if config.use_pretty_format {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .pretty()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                ts_fmt::layer()
                    .json()
                    .with_span_events(FmtSpan::CLOSE)
                    .with_target(true)
                    .with_current_span(true),
            )
            .with(env_filter)
            .init();
    }
}

/// Initialize logging for tests; ignores double-init from parallel tests.
#[cfg(test)]
pub fn init_test_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_sanitized_value_long_string() {
        let secret = "0x4c0883a69102937d6231471b5dbb6204fe512961708279f3e2b1b1b1a1a1a1a1";
        assert_eq!(format!("{}", SanitizedValue::new(secret)), "0x4c...REDACTED");
    }

    #[test]
    fn test_sanitized_value_short_string() {
        assert_eq!(format!("{}", SanitizedValue::new("abc")), "REDACTED");
        assert_eq!(format!("{}", SanitizedValue::new("")), "REDACTED");
        assert_eq!(format!("{}", SanitizedValue::new("12345678")), "REDACTED");
    }

    #[test]
    fn test_sanitized_value_debug() {
        let sanitized = sanitize("sk-1234567890abcdef");
        assert_eq!(format!("{:?}", sanitized), "SanitizedValue(***)");
    }

    #[test]
    fn test_sanitize_multibyte_values() {
        assert_eq!(sanitize("aéééé-secret").to_string(), "aééé...REDACTED");
        assert_eq!(sanitize("éééééééé").to_string(), "REDACTED");
        assert_eq!(sanitize_signature("ключ-подписи-eth"), "ключ-под...");
        assert_eq!(sanitize_signature("ééééééééééééé"), "éééééééé...");
    }

    #[test]
    fn test_sanitize_signature() {
        assert_eq!(
            sanitize_signature("0x1234567890abcdef1234567890abcdef"),
            "0x123456..."
        );
        assert_eq!(sanitize_signature("short"), "REDACTED");
    }

    #[test]
    #[serial(env)]
    fn test_logging_config_from_env() {
        std::env::set_var("LOG_FORMAT", "Pretty");
        std::env::set_var("RUST_LOG", "tread_link=debug");
        let config = LoggingConfig::from_env();
        assert!(config.use_pretty_format);
        assert_eq!(config.level_filter, "tread_link=debug");

        std::env::remove_var("LOG_FORMAT");
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig::from_env();
        assert!(!config.use_pretty_format);
        assert_eq!(config.level_filter, DEFAULT_LOG_LEVEL);
    }
}
