//! Pacifica Configuration

use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

pub const MAINNET_API_URL: &str = "https://api.pacifica.fi";
pub const TESTNET_API_URL: &str = "https://test-api.pacifica.fi";

pub const DEFAULT_BUILDER_CODE: &str = "treadfi";
pub const DEFAULT_MAX_FEE_RATE: &str = "0.0002";

/// Signed messages stay valid for 5 minutes
pub const DEFAULT_EXPIRY_WINDOW_MS: u64 = 300_000;

pub const DEFAULT_REFERRAL_CODE_MAINNET: &str = "treadfi";
pub const DEFAULT_REFERRAL_CODE_TESTNET: &str = "pump";

pub const BUILDER_APPROVE_PATH: &str = "/api/v1/account/builder_codes/approve";
pub const AGENT_BIND_PATH: &str = "/api/v1/agent/bind";
pub const REFERRAL_CLAIM_PATH: &str = "/api/v1/referral/user/code/claim";

/// Configuration for Pacifica linking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacificaConfig {
    #[serde(skip)]
    pub production: bool,
    pub builder_code: String,
    pub max_fee_rate: String,
    pub expiry_window_ms: u64,
    pub referral_code_mainnet: String,
    pub referral_code_testnet: String,
    pub api_url: Option<String>,
}

impl Default for PacificaConfig {
    fn default() -> Self {
        Self {
            production: true,
            builder_code: DEFAULT_BUILDER_CODE.to_string(),
            max_fee_rate: DEFAULT_MAX_FEE_RATE.to_string(),
            expiry_window_ms: DEFAULT_EXPIRY_WINDOW_MS,
            referral_code_mainnet: DEFAULT_REFERRAL_CODE_MAINNET.to_string(),
            referral_code_testnet: DEFAULT_REFERRAL_CODE_TESTNET.to_string(),
            api_url: None,
        }
    }
}

impl PacificaConfig {
    pub fn rest_base_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.production => MAINNET_API_URL.to_string(),
            None => TESTNET_API_URL.to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.rest_base_url(), path)
    }

    /// Referral code claimed for the network in use
    pub fn referral_code(&self) -> &str {
        if self.production {
            &self.referral_code_mainnet
        } else {
            &self.referral_code_testnet
        }
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        if self.builder_code.trim().is_empty() {
            return Err(ExchangeError::Validation(
                "pacifica.builder_code cannot be empty".to_string(),
            ));
        }
        let rate_ok = self
            .max_fee_rate
            .trim()
            .parse::<rust_decimal::Decimal>()
            .map(|r| r > rust_decimal::Decimal::ZERO && r < rust_decimal::Decimal::ONE)
            .unwrap_or(false);
        if !rate_ok {
            return Err(ExchangeError::Validation(format!(
                "pacifica.max_fee_rate must be a fraction between 0 and 1 (got \"{}\")",
                self.max_fee_rate
            )));
        }
        if self.expiry_window_ms == 0 {
            return Err(ExchangeError::Validation(
                "pacifica.expiry_window_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
