//! Process-wide defaults with environment variable overrides
//!
//! Venue constants (base URLs, fee rates, referral codes) live next to each
//! venue in `adapters::<venue>::config`; this module only holds values that
//! apply to every flow.

use std::time::Duration;

// =============================================================================
// HTTP
// =============================================================================

/// Total timeout for one REST request (default: 10 seconds)
///
/// Environment variable: `HTTP_TIMEOUT_SECS`
pub fn http_timeout() -> Duration {
    let secs = std::env::var("HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    Duration::from_secs(secs)
}

/// TCP/TLS connect timeout (default: 10 seconds)
///
/// Environment variable: `HTTP_CONNECT_TIMEOUT_SECS`
pub fn http_connect_timeout() -> Duration {
    let secs = std::env::var("HTTP_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);
    Duration::from_secs(secs)
}

// =============================================================================
// Operator binary
// =============================================================================

/// Path of the YAML link configuration (default: `config.yaml`)
///
/// Environment variable: `LINK_CONFIG`
pub fn config_path() -> String {
    std::env::var("LINK_CONFIG").unwrap_or_else(|_| "config.yaml".to_string())
}

/// Print the effective values at startup
pub fn log_configuration() {
    tracing::info!(
        http_timeout = ?http_timeout(),
        http_connect_timeout = ?http_connect_timeout(),
        config_path = %config_path(),
        "Runtime configuration"
    );
}
