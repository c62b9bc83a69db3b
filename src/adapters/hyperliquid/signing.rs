//! Hyperliquid user-signed actions
//!
//! Every action is an EIP-712 struct under the `HyperliquidSignTransaction`
//! domain, with `chainId` set to the chain the wallet is connected to and a
//! zero verifying contract. The same fields are posted as the `action`
//! object, tagged with `type`, `signatureChainId` and `hyperliquidChain`.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use super::config::MAX_AGENT_NAME_LEN;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::signing::eip712::{parse_address, EvmDomain, FieldValue, TypedDataRequest, TypedStruct};

pub const SIGNATURE_DOMAIN_NAME: &str = "HyperliquidSignTransaction";
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Token moved by `sendAsset`
pub const SEND_ASSET_TOKEN: &str = "USDC";

/// Agent wallet registered by approveAgent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentApproval {
    pub agent_address: String,
    pub agent_name: String,
}

/// `sendAsset` members other than token and nonce
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SendAssetParams {
    pub destination: String,
    pub source_dex: String,
    pub destination_dex: String,
    pub amount: String,
    /// Empty when sending from the main account
    pub from_sub_account: String,
}

/// A user-signed action and its nonce/time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    ApproveBuilderFee {
        max_fee_rate: String,
        builder: String,
        nonce: u64,
    },
    ApproveAgent {
        agent: AgentApproval,
        nonce: u64,
    },
    Withdraw {
        destination: String,
        amount: String,
        time: u64,
    },
    SpotSend {
        destination: String,
        token: String,
        amount: String,
        time: u64,
    },
    SendAsset {
        params: SendAssetParams,
        nonce: u64,
    },
}

impl UserAction {
    /// Value of the action's `type` member
    pub fn action_type(&self) -> &'static str {
        match self {
            UserAction::ApproveBuilderFee { .. } => "approveBuilderFee",
            UserAction::ApproveAgent { .. } => "approveAgent",
            UserAction::Withdraw { .. } => "withdraw3",
            UserAction::SpotSend { .. } => "spotSend",
            UserAction::SendAsset { .. } => "sendAsset",
        }
    }

    pub fn primary_type(&self) -> &'static str {
        match self {
            UserAction::ApproveBuilderFee { .. } => "HyperliquidTransaction:ApproveBuilderFee",
            UserAction::ApproveAgent { .. } => "HyperliquidTransaction:ApproveAgent",
            UserAction::Withdraw { .. } => "HyperliquidTransaction:Withdraw",
            UserAction::SpotSend { .. } => "HyperliquidTransaction:SpotSend",
            UserAction::SendAsset { .. } => "HyperliquidTransaction:SendAsset",
        }
    }

    /// Nonce posted next to the action (the `time` member for transfers)
    pub fn nonce(&self) -> u64 {
        match self {
            UserAction::ApproveBuilderFee { nonce, .. }
            | UserAction::ApproveAgent { nonce, .. }
            | UserAction::SendAsset { nonce, .. } => *nonce,
            UserAction::Withdraw { time, .. } | UserAction::SpotSend { time, .. } => *time,
        }
    }

    /// Signed members, in type-string order
    pub fn typed_struct(&self, hyperliquid_chain: &str) -> TypedStruct {
        let s = TypedStruct::new(self.primary_type())
            .field("hyperliquidChain", FieldValue::Str(hyperliquid_chain.to_string()));
        match self {
            UserAction::ApproveBuilderFee {
                max_fee_rate,
                builder,
                nonce,
            } => s
                .field("maxFeeRate", FieldValue::Str(max_fee_rate.clone()))
                .field("builder", FieldValue::Address(builder.clone()))
                .field("nonce", FieldValue::U64(*nonce)),
            UserAction::ApproveAgent { agent, nonce } => s
                .field("agentAddress", FieldValue::Address(agent.agent_address.clone()))
                .field("agentName", FieldValue::Str(agent.agent_name.clone()))
                .field("nonce", FieldValue::U64(*nonce)),
            UserAction::Withdraw {
                destination,
                amount,
                time,
            } => s
                .field("destination", FieldValue::Str(destination.clone()))
                .field("amount", FieldValue::Str(amount.clone()))
                .field("time", FieldValue::U64(*time)),
            UserAction::SpotSend {
                destination,
                token,
                amount,
                time,
            } => s
                .field("destination", FieldValue::Str(destination.clone()))
                .field("token", FieldValue::Str(token.clone()))
                .field("amount", FieldValue::Str(amount.clone()))
                .field("time", FieldValue::U64(*time)),
            UserAction::SendAsset { params, nonce } => s
                .field("destination", FieldValue::Str(params.destination.clone()))
                .field("sourceDex", FieldValue::Str(params.source_dex.clone()))
                .field("destinationDex", FieldValue::Str(params.destination_dex.clone()))
                .field("token", FieldValue::Str(SEND_ASSET_TOKEN.to_string()))
                .field("amount", FieldValue::Str(params.amount.clone()))
                .field("fromSubAccount", FieldValue::Str(params.from_sub_account.clone()))
                .field("nonce", FieldValue::U64(*nonce)),
        }
    }

    /// `action` object of the `/exchange` body
    pub fn to_action_json(&self, hyperliquid_chain: &str, chain_id: u64) -> Value {
        let mut action = Map::new();
        action.insert("type".to_string(), json!(self.action_type()));
        action.insert(
            "signatureChainId".to_string(),
            json!(format!("0x{:x}", chain_id)),
        );
        if let Value::Object(members) = self.typed_struct(hyperliquid_chain).message_json() {
            action.extend(members);
        }
        Value::Object(action)
    }

    /// Wallet-facing typed data plus digest
    pub fn signing_request(&self, hyperliquid_chain: &str, chain_id: u64) -> ExchangeResult<TypedDataRequest> {
        TypedDataRequest::new(&domain(chain_id), &self.typed_struct(hyperliquid_chain))
    }
}

pub fn domain(chain_id: u64) -> EvmDomain {
    EvmDomain {
        name: SIGNATURE_DOMAIN_NAME.to_string(),
        version: "1".to_string(),
        chain_id,
        verifying_contract: Some(ZERO_ADDRESS.to_string()),
    }
}

/// `<prefix><last 16 chars of the lowercased address>`, cut to 16 chars
pub fn agent_name(prefix: &str, address: &str) -> String {
    let lower = address.trim().to_lowercase();
    let chars: Vec<char> = lower.chars().collect();
    let start = chars.len().saturating_sub(16);
    let suffix: String = chars[start..].iter().collect();
    format!("{}{}", prefix, suffix)
        .chars()
        .take(MAX_AGENT_NAME_LEN)
        .collect()
}

/// Canonical wire form of a positive decimal amount
pub fn normalize_amount(amount: &str) -> ExchangeResult<String> {
    let value = Decimal::from_str(amount.trim())
        .map_err(|_| ExchangeError::Validation(format!("amount '{}' is not a decimal number", amount)))?;
    if value <= Decimal::ZERO {
        return Err(ExchangeError::Validation(format!(
            "amount must be positive (got {})",
            amount
        )));
    }
    Ok(value.normalize().to_string())
}

/// Lowercase `0x` address, or `Validation`
pub fn normalize_address(address: &str, what: &str) -> ExchangeResult<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(ExchangeError::Validation(format!("{} is required", what)));
    }
    parse_address(trimmed)
        .map_err(|_| ExchangeError::Validation(format!("{} '{}' is not an EVM address", what, trimmed)))?;
    Ok(trimmed.to_lowercase())
}
