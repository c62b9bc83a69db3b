//! In-process wallets backed by locally held keys
//!
//! Used for freshly generated agent keys and by the operator binary. The
//! secret material stays inside these types: `Debug` never prints it and
//! only the explicit export methods hand it out.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey as Ed25519SigningKey};
use rand::rngs::OsRng;

use super::{EvmWallet, SolanaWallet, WalletError};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::signing::eip712::{EvmSignature, TypedDataRequest};

// =============================================================================
// EVM
// =============================================================================

/// secp256k1 key acting as a connected EVM wallet
pub struct LocalEvmWallet {
    signer: PrivateKeySigner,
    chain_id: AtomicU64,
}

impl LocalEvmWallet {
    pub fn new(signer: PrivateKeySigner, chain_id: u64) -> Self {
        Self {
            signer,
            chain_id: AtomicU64::new(chain_id),
        }
    }

    /// Fresh random key
    pub fn random(chain_id: u64) -> Self {
        Self::new(PrivateKeySigner::random(), chain_id)
    }

    /// Parse a hex private key (with or without `0x`)
    pub fn from_private_key(private_key: &str, chain_id: u64) -> ExchangeResult<Self> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|_| ExchangeError::Validation("invalid EVM private key".to_string()))?;
        Ok(Self::new(signer, chain_id))
    }

    /// EIP-55 checksummed address
    pub fn checksum_address(&self) -> String {
        self.signer.address().to_checksum(None)
    }

    /// `0x`-prefixed private key hex. Only for handing credentials to the caller.
    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signer.credential().to_bytes()))
    }
}

impl std::fmt::Debug for LocalEvmWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEvmWallet")
            .field("address", &self.checksum_address())
            .field("chain_id", &self.chain_id.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EvmWallet for LocalEvmWallet {
    async fn address(&self) -> Result<String, WalletError> {
        Ok(self.checksum_address())
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        Ok(self.chain_id.load(Ordering::Relaxed))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.chain_id.store(chain_id, Ordering::Relaxed);
        Ok(())
    }

    async fn sign_typed_data(&self, request: &TypedDataRequest) -> Result<EvmSignature, WalletError> {
        let sig = self
            .signer
            .sign_hash_sync(&request.digest)
            .map_err(|e| WalletError::new(None, e.to_string()))?;
        EvmSignature::from_bytes(&sig.as_bytes()).map_err(|e| WalletError::new(None, e.to_string()))
    }

    async fn personal_sign(&self, message: &str) -> Result<EvmSignature, WalletError> {
        let sig = self
            .signer
            .sign_message_sync(message.as_bytes())
            .map_err(|e| WalletError::new(None, e.to_string()))?;
        EvmSignature::from_bytes(&sig.as_bytes()).map_err(|e| WalletError::new(None, e.to_string()))
    }
}

// =============================================================================
// Solana
// =============================================================================

/// ed25519 keypair acting as a connected Solana wallet
pub struct SolanaKeypair {
    signing_key: Ed25519SigningKey,
}

impl SolanaKeypair {
    pub fn generate() -> Self {
        Self {
            signing_key: Ed25519SigningKey::generate(&mut OsRng),
        }
    }

    /// Base58 secret: the 64-byte `secret || public` keypair or a 32-byte seed
    pub fn from_base58(secret: &str) -> ExchangeResult<Self> {
        let bytes = bs58::decode(secret.trim())
            .into_vec()
            .map_err(|_| ExchangeError::Validation("Solana secret key is not base58".to_string()))?;
        let signing_key = match bytes.len() {
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(&bytes);
                Ed25519SigningKey::from_keypair_bytes(&keypair).map_err(|_| {
                    ExchangeError::Validation("Solana keypair halves do not match".to_string())
                })?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                Ed25519SigningKey::from_bytes(&seed)
            }
            n => {
                return Err(ExchangeError::Validation(format!(
                    "Solana secret key must be 32 or 64 bytes, got {}",
                    n
                )))
            }
        };
        Ok(Self { signing_key })
    }

    pub fn public_key_base58(&self) -> String {
        bs58::encode(self.signing_key.verifying_key().to_bytes()).into_string()
    }

    /// Base58 of the 64-byte keypair, the format Solana tooling imports
    pub fn secret_key_base58(&self) -> String {
        bs58::encode(self.signing_key.to_keypair_bytes()).into_string()
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl std::fmt::Debug for SolanaKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaKeypair")
            .field("public_key", &self.public_key_base58())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SolanaWallet for SolanaKeypair {
    async fn public_key(&self) -> Result<String, WalletError> {
        Ok(self.public_key_base58())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        Ok(self.sign(message).to_vec())
    }
}
