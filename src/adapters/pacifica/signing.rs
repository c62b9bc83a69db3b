//! Pacifica signed messages
//!
//! A message is `{data, expiry_window, timestamp, type}` rendered as compact
//! JSON with every object's keys sorted; the ed25519 signature covers the
//! UTF-8 bytes of that text. The POST body repeats the header fields and
//! flattens `data` next to them.

use serde_json::{json, Map, Value};

/// Signed operation types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    ApproveBuilderCode,
    BindAgentWallet,
    ClaimReferralCode,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::ApproveBuilderCode => "approve_builder_code",
            OperationType::BindAgentWallet => "bind_agent_wallet",
            OperationType::ClaimReferralCode => "claim_referral_code",
        }
    }
}

/// One operation ready to be signed
#[derive(Debug, Clone, PartialEq)]
pub struct SignedOperation {
    pub operation: OperationType,
    pub data: Value,
    pub timestamp: u64,
    pub expiry_window: u64,
}

impl SignedOperation {
    pub fn new(operation: OperationType, data: Value, timestamp: u64, expiry_window: u64) -> Self {
        Self {
            operation,
            data,
            timestamp,
            expiry_window,
        }
    }

    pub fn message(&self) -> Value {
        json!({
            "data": self.data,
            "expiry_window": self.expiry_window,
            "timestamp": self.timestamp,
            "type": self.operation.as_str(),
        })
    }

    /// Bytes handed to the signer
    pub fn message_bytes(&self) -> Vec<u8> {
        canonical_json(&self.message()).into_bytes()
    }

    /// POST body for `account`, signed with `signature` (base58).
    ///
    /// `agent_wallet` is set when the agent key signed instead of the account.
    pub fn request_body(&self, account: &str, signature: &str, agent_wallet: Option<&str>) -> Value {
        let mut body = Map::new();
        body.insert("account".into(), json!(account));
        if let Some(agent) = agent_wallet {
            body.insert("agent_wallet".into(), json!(agent));
        }
        body.insert("signature".into(), json!(signature));
        body.insert("timestamp".into(), json!(self.timestamp));
        body.insert("expiry_window".into(), json!(self.expiry_window));
        if let Value::Object(fields) = &self.data {
            for (k, v) in fields {
                body.insert(k.clone(), v.clone());
            }
        }
        Value::Object(body)
    }
}

/// Compact JSON with object keys sorted at every depth
pub fn canonical_json(value: &Value) -> String {
    sort_keys(value).to_string()
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
