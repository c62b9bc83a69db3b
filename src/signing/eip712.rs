//! EIP-712 typed data for flat structs
//!
//! Builds the wallet-facing `eth_signTypedData_v4` JSON together with the
//! digest a local key signs, so both kinds of signer sign identical bytes.
//! Only flat structs with `string`, `address` and `uint64` members are
//! supported, which covers every user-signed action the venues use.

use std::str::FromStr;

use alloy_primitives::B256;
use ethers::abi::{encode, Token};
use ethers::types::{Address, U256};
use ethers::utils::keccak256;
use serde_json::{json, Map, Value};

use crate::adapters::errors::{ExchangeError, ExchangeResult};

// =============================================================================
// Domain
// =============================================================================

/// EIP-712 domain; members left as `None` are omitted from the type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmDomain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Option<String>,
}

impl EvmDomain {
    fn type_string(&self) -> String {
        let mut members = vec!["string name", "string version", "uint256 chainId"];
        if self.verifying_contract.is_some() {
            members.push("address verifyingContract");
        }
        format!("EIP712Domain({})", members.join(","))
    }

    /// `EIP712Domain` entry of the `types` object
    pub fn types_json(&self) -> Value {
        let mut members = vec![
            json!({"name": "name", "type": "string"}),
            json!({"name": "version", "type": "string"}),
            json!({"name": "chainId", "type": "uint256"}),
        ];
        if self.verifying_contract.is_some() {
            members.push(json!({"name": "verifyingContract", "type": "address"}));
        }
        Value::Array(members)
    }

    pub fn to_json(&self) -> Value {
        let mut domain = json!({
            "name": self.name,
            "version": self.version,
            "chainId": self.chain_id,
        });
        if let Some(contract) = &self.verifying_contract {
            domain["verifyingContract"] = Value::String(contract.clone());
        }
        domain
    }

    /// Domain separator hash
    pub fn separator(&self) -> ExchangeResult<[u8; 32]> {
        let mut tokens = vec![
            Token::FixedBytes(keccak256(self.type_string()).to_vec()),
            Token::FixedBytes(keccak256(self.name.as_bytes()).to_vec()),
            Token::FixedBytes(keccak256(self.version.as_bytes()).to_vec()),
            Token::Uint(U256::from(self.chain_id)),
        ];
        if let Some(contract) = &self.verifying_contract {
            tokens.push(Token::Address(parse_address(contract)?));
        }
        Ok(keccak256(encode(&tokens)))
    }
}

// =============================================================================
// Struct
// =============================================================================

/// Value of one struct member, tagged with its solidity type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Address(String),
    U64(u64),
}

impl FieldValue {
    fn sol_type(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "string",
            FieldValue::Address(_) => "address",
            FieldValue::U64(_) => "uint64",
        }
    }

    fn token(&self) -> ExchangeResult<Token> {
        Ok(match self {
            FieldValue::Str(s) => Token::FixedBytes(keccak256(s.as_bytes()).to_vec()),
            FieldValue::Address(a) => Token::Address(parse_address(a)?),
            FieldValue::U64(n) => Token::Uint(U256::from(*n)),
        })
    }

    fn to_json(&self) -> Value {
        match self {
            FieldValue::Str(s) | FieldValue::Address(s) => Value::String(s.clone()),
            FieldValue::U64(n) => Value::from(*n),
        }
    }
}

/// A flat EIP-712 struct: primary type name plus ordered members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedStruct {
    pub primary_type: String,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl TypedStruct {
    pub fn new(primary_type: impl Into<String>) -> Self {
        Self {
            primary_type: primary_type.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, value: FieldValue) -> Self {
        self.fields.push((name, value));
        self
    }

    /// e.g. `HyperliquidTransaction:ApproveAgent(string hyperliquidChain,...)`
    pub fn type_string(&self) -> String {
        let members: Vec<String> = self
            .fields
            .iter()
            .map(|(name, value)| format!("{} {}", value.sol_type(), name))
            .collect();
        format!("{}({})", self.primary_type, members.join(","))
    }

    pub fn struct_hash(&self) -> ExchangeResult<[u8; 32]> {
        let mut tokens = vec![Token::FixedBytes(keccak256(self.type_string()).to_vec())];
        for (_, value) in &self.fields {
            tokens.push(value.token()?);
        }
        Ok(keccak256(encode(&tokens)))
    }

    pub fn types_json(&self) -> Value {
        Value::Array(
            self.fields
                .iter()
                .map(|(name, value)| json!({"name": name, "type": value.sol_type()}))
                .collect(),
        )
    }

    pub fn message_json(&self) -> Value {
        let mut message = Map::new();
        for (name, value) in &self.fields {
            message.insert((*name).to_string(), value.to_json());
        }
        Value::Object(message)
    }
}

// =============================================================================
// Request
// =============================================================================

/// Everything a wallet needs to sign one typed-data message
#[derive(Debug, Clone, PartialEq)]
pub struct TypedDataRequest {
    pub primary_type: String,
    pub domain: Value,
    pub types: Value,
    pub message: Value,
    /// `keccak256("\x19\x01" || domainSeparator || structHash)`
    pub digest: B256,
}

impl TypedDataRequest {
    pub fn new(domain: &EvmDomain, message: &TypedStruct) -> ExchangeResult<Self> {
        let digest = signing_digest(&domain.separator()?, &message.struct_hash()?);
        Ok(Self::with_digest(domain, message, digest))
    }

    /// Assemble a request whose digest was computed elsewhere
    pub fn with_digest(domain: &EvmDomain, message: &TypedStruct, digest: B256) -> Self {
        let mut types = Map::new();
        types.insert("EIP712Domain".to_string(), domain.types_json());
        types.insert(message.primary_type.clone(), message.types_json());
        Self {
            primary_type: message.primary_type.clone(),
            domain: domain.to_json(),
            types: Value::Object(types),
            message: message.message_json(),
            digest,
        }
    }

    /// Payload for `eth_signTypedData_v4`
    pub fn to_json(&self) -> Value {
        json!({
            "types": self.types,
            "primaryType": self.primary_type,
            "domain": self.domain,
            "message": self.message,
        })
    }
}

/// EIP-712 final hash: keccak256("\x19\x01" + domainSeparator + structHash)
pub fn signing_digest(domain_separator: &[u8; 32], struct_hash: &[u8; 32]) -> B256 {
    let mut data = Vec::with_capacity(66);
    data.push(0x19);
    data.push(0x01);
    data.extend_from_slice(domain_separator);
    data.extend_from_slice(struct_hash);
    B256::from(keccak256(&data))
}

pub fn parse_address(address: &str) -> ExchangeResult<Address> {
    Address::from_str(address.trim())
        .map_err(|e| ExchangeError::Validation(format!("invalid EVM address '{}': {}", address, e)))
}

// =============================================================================
// Signature
// =============================================================================

/// 65-byte secp256k1 signature with `v` normalized to 27/28
#[derive(Clone, PartialEq, Eq)]
pub struct EvmSignature {
    bytes: [u8; 65],
}

impl EvmSignature {
    pub fn from_bytes(raw: &[u8]) -> ExchangeResult<Self> {
        if raw.len() != 65 {
            return Err(ExchangeError::SigningFailed(format!(
                "invalid signature length: {} (expected 65)",
                raw.len()
            )));
        }
        let mut bytes = [0u8; 65];
        bytes.copy_from_slice(raw);
        match bytes[64] {
            0 | 1 => bytes[64] += 27,
            27 | 28 => {}
            v => {
                return Err(ExchangeError::SigningFailed(format!(
                    "invalid signature v value: {} (expected 0, 1, 27, or 28)",
                    v
                )))
            }
        }
        Ok(Self { bytes })
    }

    pub fn from_hex(sig: &str) -> ExchangeResult<Self> {
        let raw = hex::decode(sig.trim().trim_start_matches("0x"))
            .map_err(|e| ExchangeError::SigningFailed(format!("signature is not hex: {}", e)))?;
        Self::from_bytes(&raw)
    }

    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.bytes[..32]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.bytes[32..64]);
        s
    }

    pub fn v(&self) -> u8 {
        self.bytes[64]
    }

    pub fn as_bytes(&self) -> &[u8; 65] {
        &self.bytes
    }

    /// `0x`-prefixed 130 hex chars
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.bytes))
    }

    /// `{r, s, v}` object as Hyperliquid expects it
    pub fn to_rsv_json(&self) -> Value {
        json!({
            "r": format!("0x{}", hex::encode(self.r())),
            "s": format!("0x{}", hex::encode(self.s())),
            "v": self.v(),
        })
    }
}

impl std::fmt::Debug for EvmSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "EvmSignature({})",
            crate::core::logging::sanitize_signature(&self.to_hex())
        )
    }
}
