//! Paradex Signing
//!
//! Bridges the EVM wallet to a Starknet account:
//! 1. The wallet signs the fixed EIP-712 message `Constant{action:"STARK Key"}`
//! 2. The signature's `r` is ground into a STARK curve private key
//! 3. The account address follows from the public key and the class hashes
//!
//! Then builds the SNIP-12 typed data for onboarding and `/auth`.

use alloy_primitives::U256;
use alloy_sol_types::{sol, Eip712Domain, SolStruct};
use num_bigint::BigUint;
use num_traits::Num;
use sha2::{Digest, Sha256};
use starknet_core::types::Felt;
use starknet_core::utils::{get_contract_address, get_selector_from_name};
use starknet_signers::SigningKey;

use super::config::AUTH_SIGNATURE_TTL_SECS;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::signing::eip712::{EvmDomain, EvmSignature, FieldValue, TypedDataRequest, TypedStruct};
use crate::signing::starknet::{parse_felt, FeltValue, StarknetDomain, StarknetTypedData};

/// Order of the STARK curve generator
const EC_ORDER_HEX: &str = "0800000000000010ffffffffffffffffb781126dcae7b2321e66a241adc64d2f";

pub const DOMAIN_NAME: &str = "Paradex";
pub const STARK_KEY_ACTION: &str = "STARK Key";

sol! {
    struct Constant {
        string action;
    }
}

// =============================================================================
// EVM side
// =============================================================================

/// EIP-712 request the wallet signs to reveal its Paradex key
pub fn stark_key_request(l1_chain_id: u64) -> TypedDataRequest {
    let domain = EvmDomain {
        name: DOMAIN_NAME.to_string(),
        version: "1".to_string(),
        chain_id: l1_chain_id,
        verifying_contract: None,
    };
    let message = TypedStruct::new("Constant")
        .field("action", FieldValue::Str(STARK_KEY_ACTION.to_string()));

    let sol_domain = Eip712Domain::new(
        Some(DOMAIN_NAME.into()),
        Some("1".into()),
        Some(U256::from(l1_chain_id)),
        None,
        None,
    );
    let digest = Constant {
        action: STARK_KEY_ACTION.into(),
    }
    .eip712_signing_hash(&sol_domain);

    TypedDataRequest::with_digest(&domain, &message, digest)
}

// =============================================================================
// Key derivation
// =============================================================================

/// Hash `seed` until it lands below the largest multiple of the curve order
/// that fits in 256 bits, then reduce it.
pub fn grind_key(seed: &[u8]) -> ExchangeResult<BigUint> {
    let order = BigUint::from_str_radix(EC_ORDER_HEX, 16)
        .map_err(|e| ExchangeError::SigningFailed(format!("curve order: {}", e)))?;
    let mask = BigUint::from(1u8) << 256;
    let limit = &mask - (&mask % &order);

    for i in 0u64..100_000 {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(var_bytes_be(i));
        let key = BigUint::from_bytes_be(&hasher.finalize());
        if key < limit {
            return Ok(key % &order);
        }
    }
    Err(ExchangeError::SigningFailed(
        "could not grind a Starknet key".to_string(),
    ))
}

/// Minimal big-endian bytes, `[0]` for zero
fn var_bytes_be(n: u64) -> Vec<u8> {
    let bytes = n.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(7);
    bytes[first..].to_vec()
}

/// Paradex private key for a STARK Key signature
pub fn private_key_from_eth_signature(signature: &EvmSignature) -> ExchangeResult<Felt> {
    let key = grind_key(&signature.r())?;
    let bytes = key.to_bytes_be();
    let mut padded = [0u8; 32];
    padded[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(Felt::from_bytes_be(&padded))
}

pub fn public_key(private_key: Felt) -> Felt {
    SigningKey::from_secret_scalar(private_key)
        .verifying_key()
        .scalar()
}

/// Address of the account proxy deployed for `public_key`
pub fn derive_account_address(
    public_key: Felt,
    paraclear_account_hash: &str,
    paraclear_account_proxy_hash: &str,
) -> ExchangeResult<Felt> {
    let account_hash = parse_felt(paraclear_account_hash, "account class hash")?;
    let proxy_hash = parse_felt(paraclear_account_proxy_hash, "account proxy class hash")?;
    let initialize = get_selector_from_name("initialize")
        .map_err(|e| ExchangeError::SigningFailed(format!("initialize selector: {}", e)))?;

    // [implementation, selector, calldata_len, public_key, guardian]
    let calldata = [
        account_hash,
        initialize,
        Felt::from(2u64),
        public_key,
        Felt::ZERO,
    ];
    Ok(get_contract_address(public_key, proxy_hash, &calldata, Felt::ZERO))
}

// =============================================================================
// Starknet messages
// =============================================================================

pub fn domain(starknet_chain_id: &str) -> StarknetDomain {
    StarknetDomain {
        name: DOMAIN_NAME.to_string(),
        chain_id: starknet_chain_id.to_string(),
        version: 1,
    }
}

pub fn onboarding_message(starknet_chain_id: &str) -> StarknetTypedData {
    StarknetTypedData::new(domain(starknet_chain_id), "Constant")
        .field("action", FeltValue::Short("Onboarding".to_string()))
}

/// `/auth` request signed at `timestamp` (seconds); returns the expiration too
pub fn auth_message(starknet_chain_id: &str, timestamp: u64) -> (StarknetTypedData, u64) {
    let expiration = timestamp + AUTH_SIGNATURE_TTL_SECS;
    let data = StarknetTypedData::new(domain(starknet_chain_id), "Request")
        .field("method", FeltValue::Short("POST".to_string()))
        .field("path", FeltValue::Short("/v1/auth".to_string()))
        .field("body", FeltValue::Short(String::new()))
        .field("timestamp", FeltValue::Int(timestamp))
        .field("expiration", FeltValue::Int(expiration));
    (data, expiration)
}

#[cfg(test)]
mod tests {
    use super::super::config::{TEST_ETH_PRIVATE_KEY, TEST_PARADEX_PRIVATE_KEY};
    use super::*;
    use crate::wallet::{EvmWallet, LocalEvmWallet};

    const ACCOUNT_HASH: &str = "0x41cb0280ebadaa75f996d8d92c6f265f6d040bb3ba442e5f86a554f1765244e";
    const PROXY_HASH: &str = "0x3530cc4759d78042f1b543bf797f5f3d647cde0388c33734cf91b7f7b9314a9";

    #[test]
    fn test_alloy_digest_matches_generic_encoder() {
        let request = stark_key_request(11_155_111);
        let domain = EvmDomain {
            name: DOMAIN_NAME.to_string(),
            version: "1".to_string(),
            chain_id: 11_155_111,
            verifying_contract: None,
        };
        let message = TypedStruct::new("Constant")
            .field("action", FieldValue::Str(STARK_KEY_ACTION.to_string()));
        let generic = TypedDataRequest::new(&domain, &message).unwrap();
        assert_eq!(request.digest, generic.digest);
        assert_eq!(request.to_json(), generic.to_json());
    }

    #[tokio::test]
    async fn test_known_eth_key_derives_known_paradex_key() {
        let wallet = LocalEvmWallet::from_private_key(TEST_ETH_PRIVATE_KEY, 1).unwrap();
        let sig = wallet.sign_typed_data(&stark_key_request(1)).await.unwrap();
        let private_key = private_key_from_eth_signature(&sig).unwrap();
        assert_eq!(private_key, Felt::from_hex(TEST_PARADEX_PRIVATE_KEY).unwrap());
    }

    #[tokio::test]
    async fn test_derivation_is_deterministic() {
        let wallet = LocalEvmWallet::from_private_key(TEST_ETH_PRIVATE_KEY, 1).unwrap();
        let derive = || async {
            let sig = wallet.sign_typed_data(&stark_key_request(1)).await.unwrap();
            let key = private_key_from_eth_signature(&sig).unwrap();
            derive_account_address(public_key(key), ACCOUNT_HASH, PROXY_HASH).unwrap()
        };
        let first = derive().await;
        let second = derive().await;
        assert_eq!(first, second);
        assert_ne!(first, Felt::ZERO);
    }

    #[test]
    fn test_grind_key_below_order() {
        let order = BigUint::from_str_radix(EC_ORDER_HEX, 16).unwrap();
        for seed in [[0u8; 32], [0xff; 32], [0x5a; 32]] {
            assert!(grind_key(&seed).unwrap() < order);
        }
    }

    #[test]
    fn test_var_bytes() {
        assert_eq!(var_bytes_be(0), vec![0]);
        assert_eq!(var_bytes_be(1), vec![1]);
        assert_eq!(var_bytes_be(256), vec![1, 0]);
    }

    #[test]
    fn test_different_class_hash_changes_address() {
        let pk = public_key(Felt::from(12345u64));
        let a = derive_account_address(pk, ACCOUNT_HASH, PROXY_HASH).unwrap();
        let b = derive_account_address(pk, PROXY_HASH, ACCOUNT_HASH).unwrap();
        assert_ne!(a, b);
        assert!(derive_account_address(pk, "not-hex", PROXY_HASH).is_err());
    }

    #[test]
    fn test_auth_message_expires_in_seven_days() {
        let (data, expiration) = auth_message("PRIVATE_SN_POTC_SEPOLIA", 1_700_000_000);
        assert_eq!(expiration, 1_700_000_000 + 604_800);
        assert_eq!(
            data.type_string(),
            "Request(method:felt,path:felt,body:felt,timestamp:felt,expiration:felt)"
        );
        assert_eq!(onboarding_message("X").type_string(), "Constant(action:felt)");
    }
}
