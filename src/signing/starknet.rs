//! Starknet typed data (legacy SNIP-12, `felt` members only)
//!
//! Hash layout:
//! - domain   = H(type_hash("StarkNetDomain(...)"), name, chainId, version)
//! - struct   = H(type_hash(type string), member felts...)
//! - message  = H("StarkNet Message", domain, account, struct)
//!
//! where `H` is `compute_hash_on_elements` (Pedersen chain plus length).

use num_bigint::BigUint;
use starknet_core::crypto::compute_hash_on_elements;
use starknet_core::types::Felt;
use starknet_core::utils::{cairo_short_string_to_felt, starknet_keccak};
use starknet_signers::SigningKey;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

const DOMAIN_TYPE: &str = "StarkNetDomain(name:felt,chainId:felt,version:felt)";
const MESSAGE_PREFIX: &str = "StarkNet Message";

/// A `felt` member value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeltValue {
    /// Cairo short string (at most 31 ASCII chars)
    Short(String),
    Int(u64),
}

impl FeltValue {
    pub fn to_felt(&self) -> ExchangeResult<Felt> {
        match self {
            FeltValue::Short(s) => cairo_short_string_to_felt(s).map_err(|e| {
                ExchangeError::Validation(format!("'{}' is not a Cairo short string: {}", s, e))
            }),
            FeltValue::Int(n) => Ok(Felt::from(*n)),
        }
    }
}

/// `StarkNetDomain` members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarknetDomain {
    pub name: String,
    pub chain_id: String,
    pub version: u64,
}

impl StarknetDomain {
    pub fn hash(&self) -> ExchangeResult<Felt> {
        Ok(compute_hash_on_elements(&[
            starknet_keccak(DOMAIN_TYPE.as_bytes()),
            FeltValue::Short(self.name.clone()).to_felt()?,
            FeltValue::Short(self.chain_id.clone()).to_felt()?,
            Felt::from(self.version),
        ]))
    }
}

/// One typed-data message over a flat struct of felts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarknetTypedData {
    pub domain: StarknetDomain,
    pub primary_type: String,
    pub fields: Vec<(&'static str, FeltValue)>,
}

impl StarknetTypedData {
    pub fn new(domain: StarknetDomain, primary_type: impl Into<String>) -> Self {
        Self {
            domain,
            primary_type: primary_type.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &'static str, value: FeltValue) -> Self {
        self.fields.push((name, value));
        self
    }

    /// e.g. `Constant(action:felt)`
    pub fn type_string(&self) -> String {
        let members: Vec<String> = self
            .fields
            .iter()
            .map(|(name, _)| format!("{}:felt", name))
            .collect();
        format!("{}({})", self.primary_type, members.join(","))
    }

    pub fn struct_hash(&self) -> ExchangeResult<Felt> {
        let mut elements = vec![starknet_keccak(self.type_string().as_bytes())];
        for (_, value) in &self.fields {
            elements.push(value.to_felt()?);
        }
        Ok(compute_hash_on_elements(&elements))
    }

    /// Hash signed on behalf of `account`
    pub fn message_hash(&self, account: Felt) -> ExchangeResult<Felt> {
        let prefix = FeltValue::Short(MESSAGE_PREFIX.to_string()).to_felt()?;
        Ok(compute_hash_on_elements(&[
            prefix,
            self.domain.hash()?,
            account,
            self.struct_hash()?,
        ]))
    }
}

/// Sign `data` for `account` with `key`
pub fn sign_typed_data(
    key: &SigningKey,
    data: &StarknetTypedData,
    account: Felt,
) -> ExchangeResult<(Felt, Felt)> {
    let hash = data.message_hash(account)?;
    let signature = key
        .sign(&hash)
        .map_err(|e| ExchangeError::SigningFailed(format!("Starknet signing failed: {}", e)))?;
    tracing::debug!(primary_type = %data.primary_type, "Starknet message signed");
    Ok((signature.r, signature.s))
}

/// Decimal rendering of a felt, as Paradex headers expect
pub fn felt_to_decimal(value: &Felt) -> String {
    BigUint::from_bytes_be(&value.to_bytes_be()).to_string()
}

/// `["<r>","<s>"]` with decimal members
pub fn signature_header(r: &Felt, s: &Felt) -> String {
    format!("[\"{}\",\"{}\"]", felt_to_decimal(r), felt_to_decimal(s))
}

/// `0x`-prefixed lowercase hex
pub fn felt_to_hex(value: &Felt) -> String {
    format!("{:#x}", value)
}

pub fn parse_felt(value: &str, what: &str) -> ExchangeResult<Felt> {
    Felt::from_hex(value.trim())
        .map_err(|e| ExchangeError::InvalidResponse(format!("invalid {} '{}': {}", what, value, e)))
}
