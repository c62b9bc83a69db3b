//! Paradex API types

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::core::http::RestResponse;

pub const VENUE: &str = "Paradex";

// =============================================================================
// System Configuration (from /system/config API)
// =============================================================================

/// Fields of `/system/config` needed to derive and onboard an account
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ParadexSystemConfig {
    /// Ethereum chain the STARK Key is signed on
    #[serde(deserialize_with = "chain_id_from_string_or_number")]
    pub l1_chain_id: u64,
    /// Starknet chain ID (e.g., "PRIVATE_SN_PARACLEAR_MAINNET")
    pub starknet_chain_id: String,
    /// Account implementation class hash
    pub paraclear_account_hash: String,
    /// Account proxy class hash for address computation
    pub paraclear_account_proxy_hash: String,
}

fn chain_id_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom("l1_chain_id is not an unsigned integer")),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse(),
            }
            .map_err(|_| serde::de::Error::custom(format!("invalid l1_chain_id '{}'", s)))
        }
        other => Err(serde::de::Error::custom(format!(
            "invalid l1_chain_id {}",
            other
        ))),
    }
}

/// `/auth` answer
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub jwt_token: Option<String>,
}

/// Paradex error body: `{"error": "CODE", "message": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct ParadexErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Require a 2xx answer; anything else is a rejection carrying the server text
pub fn expect_success(response: &RestResponse, step: &str) -> ExchangeResult<()> {
    if response.is_success() {
        return Ok(());
    }
    let detail = match serde_json::from_str::<ParadexErrorBody>(&response.body) {
        Ok(ParadexErrorBody {
            message: Some(message),
            ..
        }) if !message.is_empty() => message,
        Ok(ParadexErrorBody {
            error: Some(code), ..
        }) if !code.is_empty() => code,
        _ => response.error_message(),
    };
    Err(ExchangeError::rejected(
        VENUE,
        format!("{} failed: {}", step, detail),
    ))
}
