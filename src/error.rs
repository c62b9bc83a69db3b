//! Application-wide error types using thiserror
//!
//! Linking flows return `ExchangeError`; the binary and the config loader
//! wrap it (and their own failures) in `AppError`.

use crate::adapters::errors::ExchangeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_error_converts_to_app_error() {
        let exchange_err = ExchangeError::Network("timeout".into());
        let app_err: AppError = exchange_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("Exchange error"), "Got: {}", msg);
        assert!(msg.contains("timeout"), "Got: {}", msg);
    }

    #[test]
    fn test_serde_error_converts_to_app_error() {
        let serde_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_err: AppError = serde_err.into();
        assert!(app_err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_io_error_converts_to_app_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let app_err: AppError = io_err.into();
        let msg = app_err.to_string();
        assert!(msg.contains("IO error"), "Got: {}", msg);
        assert!(msg.contains("file missing"), "Got: {}", msg);
    }

    #[test]
    fn test_config_error_display() {
        let err = AppError::Config("missing builder address".into());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing builder address"
        );
    }
}
