//! Hyperliquid Configuration

use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::signing::eip712::parse_address;

pub const MAINNET_API_URL: &str = "https://api.hyperliquid.xyz";
pub const TESTNET_API_URL: &str = "https://api.hyperliquid-testnet.xyz";

/// Maximum builder fee the user approves
pub const DEFAULT_MAX_FEE_RATE: &str = "0.1%";

pub const DEFAULT_AGENT_NAME_PREFIX: &str = "tread-";

/// Hyperliquid refuses agent names longer than this
pub const MAX_AGENT_NAME_LEN: usize = 16;

/// Configuration for Hyperliquid linking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HyperliquidConfig {
    /// Mainnet (true) or testnet (false); set from the top-level config
    #[serde(skip)]
    pub production: bool,
    /// Fee-collecting builder used when the caller passes none
    pub builder_address: Option<String>,
    pub max_fee_rate: String,
    pub agent_name_prefix: String,
    /// Overrides the REST base URL
    pub api_url: Option<String>,
}

impl Default for HyperliquidConfig {
    fn default() -> Self {
        Self {
            production: true,
            builder_address: None,
            max_fee_rate: DEFAULT_MAX_FEE_RATE.to_string(),
            agent_name_prefix: DEFAULT_AGENT_NAME_PREFIX.to_string(),
            api_url: None,
        }
    }
}

impl HyperliquidConfig {
    pub fn rest_base_url(&self) -> String {
        match &self.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.production => MAINNET_API_URL.to_string(),
            None => TESTNET_API_URL.to_string(),
        }
    }

    /// `hyperliquidChain` member of every user-signed action
    pub fn hyperliquid_chain(&self) -> &'static str {
        if self.production {
            "Mainnet"
        } else {
            "Testnet"
        }
    }

    pub fn validate(&self) -> ExchangeResult<()> {
        let rate = self.max_fee_rate.trim();
        let valid_rate = rate
            .strip_suffix('%')
            .and_then(|r| r.parse::<rust_decimal::Decimal>().ok())
            .map(|r| r > rust_decimal::Decimal::ZERO)
            .unwrap_or(false);
        if !valid_rate {
            return Err(ExchangeError::Validation(format!(
                "hyperliquid.max_fee_rate must be a positive percentage like \"0.1%\" (got \"{}\")",
                self.max_fee_rate
            )));
        }
        if self.agent_name_prefix.len() >= MAX_AGENT_NAME_LEN {
            return Err(ExchangeError::Validation(format!(
                "hyperliquid.agent_name_prefix must be shorter than {} characters",
                MAX_AGENT_NAME_LEN
            )));
        }
        if let Some(builder) = &self.builder_address {
            parse_address(builder)?;
        }
        Ok(())
    }
}
