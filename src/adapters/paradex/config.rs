//! Paradex Configuration
//!
//! Configuration structures for Paradex account linking.

use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

// =============================================================================
// Test Constants (well-known test keys - PUBLIC, DO NOT USE IN PROD)
// =============================================================================

/// Ethereum key whose STARK Key signature on chain 1 is pinned by tests
#[cfg(test)]
pub const TEST_ETH_PRIVATE_KEY: &str =
    "0x58d27b1d66da0dee9193105c848855b43eeceb14844f2b1de00cdcb1bdce3643";

/// Paradex private key derived from `TEST_ETH_PRIVATE_KEY` on chain 1
#[cfg(test)]
pub const TEST_PARADEX_PRIVATE_KEY: &str =
    "0x549aa9cb8328a12b1394f99f9430ba2dbc2b5c26b8a4c3b9d2b3ca3765669b2";

// =============================================================================
// Configuration
// =============================================================================

pub const MAINNET_API_URL: &str = "https://api.prod.paradex.trade/v1";
pub const TESTNET_API_URL: &str = "https://api.testnet.paradex.trade/v1";

/// Name the trading subkey is registered under
pub const DEFAULT_SUBKEY_NAME: &str = "treadfi";

/// Lifetime of the `/auth` signature (7 days)
pub const AUTH_SIGNATURE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for Paradex linking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ParadexConfig {
    /// Use production endpoints (true) or testnet (false)
    #[serde(skip)]
    pub production: bool,
    pub subkey_name: String,
    /// Sent with onboarding when set
    pub referral_code: Option<String>,
    pub api_url: Option<String>,
}

impl Default for ParadexConfig {
    fn default() -> Self {
        Self {
            production: true,
            subkey_name: DEFAULT_SUBKEY_NAME.to_string(),
            referral_code: None,
            api_url: None,
        }
    }
}

impl ParadexConfig {
    /// Get REST API base URL
    pub fn rest_base_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.production => MAINNET_API_URL.to_string(),
            None => TESTNET_API_URL.to_string(),
        }
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        if self.subkey_name.trim().is_empty() {
            return Err(ExchangeError::Validation(
                "paradex.subkey_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_base_url() {
        let mut config = ParadexConfig::default();
        assert_eq!(config.rest_base_url(), MAINNET_API_URL);
        config.production = false;
        assert_eq!(config.rest_base_url(), TESTNET_API_URL);
        config.api_url = Some("http://localhost:8080/".into());
        assert_eq!(config.rest_base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_validate() {
        assert!(ParadexConfig::default().validate().is_ok());
        let config = ParadexConfig {
            subkey_name: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
