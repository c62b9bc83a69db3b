//! Aster Configuration

use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

/// Broker web3 API; Aster serves both networks from it
pub const API_URL: &str = "https://www.asterdex.com/bapi/futures/v1/public/future/web3";

/// Referral/agent code sent with the login
pub const DEFAULT_AGENT_CODE: &str = "248Dbf";
pub const DEFAULT_SOURCE_CODE: &str = "ae";
pub const DEFAULT_DESC_PREFIX: &str = "treadfi-";

/// Length of the random part of an API key description
pub const DESC_SUFFIX_LEN: usize = 8;

/// Network tag added to every request made for a Solana wallet
pub const SOLANA_NETWORK: &str = "SOL";

/// Configuration for Aster linking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AsterConfig {
    #[serde(skip)]
    pub production: bool,
    pub agent_code: String,
    pub source_code: String,
    pub desc_prefix: String,
    pub api_url: Option<String>,
}

impl Default for AsterConfig {
    fn default() -> Self {
        Self {
            production: true,
            agent_code: DEFAULT_AGENT_CODE.to_string(),
            source_code: DEFAULT_SOURCE_CODE.to_string(),
            desc_prefix: DEFAULT_DESC_PREFIX.to_string(),
            api_url: None,
        }
    }
}

impl AsterConfig {
    pub fn rest_base_url(&self) -> String {
        self.api_url
            .as_deref()
            .unwrap_or(API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn nonce_url(&self) -> String {
        format!("{}/get-nonce", self.rest_base_url())
    }

    pub fn login_url(&self) -> String {
        format!("{}/ae/login", self.rest_base_url())
    }

    pub fn create_api_key_url(&self) -> String {
        format!("{}/broker-create-api-key", self.rest_base_url())
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        for (name, value) in [
            ("aster.agent_code", &self.agent_code),
            ("aster.source_code", &self.source_code),
            ("aster.desc_prefix", &self.desc_prefix),
        ] {
            if value.trim().is_empty() {
                return Err(ExchangeError::Validation(format!("{} cannot be empty", name)));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let config = AsterConfig::default();
        assert_eq!(
            config.login_url(),
            "https://www.asterdex.com/bapi/futures/v1/public/future/web3/ae/login"
        );
        assert!(config.nonce_url().ends_with("/web3/get-nonce"));
        assert!(config.create_api_key_url().ends_with("/web3/broker-create-api-key"));

        let local = AsterConfig {
            api_url: Some("http://127.0.0.1:9000/".to_string()),
            ..Default::default()
        };
        assert_eq!(local.nonce_url(), "http://127.0.0.1:9000/get-nonce");
    }

    #[test]
    fn test_validate_rejects_empty_codes() {
        assert!(AsterConfig::default().validate().is_ok());
        let config = AsterConfig {
            agent_code: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
