//! Wallet capabilities consumed by the linking flows
//!
//! A linking flow never discovers or connects a wallet itself. The caller
//! hands in an already-connected capability:
//! - `EvmWallet` - typed-data and personal signing on an EVM account
//! - `SolanaWallet` - raw ed25519 message signing on a Solana account
//!
//! `JsonRpcWallet` adapts any raw EIP-1193 style provider into an
//! `EvmWallet`; `LocalEvmWallet` and `SolanaKeypair` sign with keys held in
//! process (operator binary, freshly generated agents, tests).

pub mod json_rpc;
pub mod local;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::adapters::errors::ExchangeError;
use crate::core::cancel::with_cancel;
use crate::signing::eip712::{EvmSignature, TypedDataRequest};

pub use json_rpc::{Eip1193Provider, JsonRpcWallet};
pub use local::{LocalEvmWallet, SolanaKeypair};

/// EIP-1193 "User Rejected Request"
pub const USER_REJECTED_CODE: i64 = 4001;

/// Lowercased fragments wallets use when the user dismisses a prompt
const REJECTION_PATTERNS: &[&str] = &[
    "user rejected",
    "user denied",
    "rejected the request",
    "user cancel",
    "action_rejected",
];

// =============================================================================
// Errors
// =============================================================================

/// Error reported by a wallet, as loosely shaped as wallets report them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct WalletError {
    /// EIP-1193 / JSON-RPC error code, when the wallet supplies one
    pub code: Option<i64>,
    pub message: String,
}

impl WalletError {
    pub fn new(code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The user declined the prompt.
    ///
    /// Code 4001 decides first; message matching covers wallets that report
    /// no code or wrap the rejection in a generic internal error.
    pub fn is_user_rejection(&self) -> bool {
        self.code == Some(USER_REJECTED_CODE) || contains_rejection_text(&self.message)
    }
}

fn contains_rejection_text(message: &str) -> bool {
    let lower = message.to_lowercase();
    REJECTION_PATTERNS.iter().any(|p| lower.contains(p))
}

impl From<WalletError> for ExchangeError {
    fn from(err: WalletError) -> Self {
        if err.is_user_rejection() {
            return ExchangeError::UserRejected(err.message);
        }
        let detail = err.message.trim();
        let message = match (err.code, detail.is_empty()) {
            (Some(code), false) => format!("wallet returned error {}: {}", code, detail),
            (Some(code), true) => format!("wallet returned error {}", code),
            (None, false) => format!("wallet returned an error: {}", detail),
            (None, true) => "wallet returned an unknown error".to_string(),
        };
        ExchangeError::SigningFailed(message)
    }
}

// =============================================================================
// Capabilities
// =============================================================================

/// Which family of signatures a wallet produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
    Evm,
    Solana,
}

impl std::fmt::Display for ChainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainType::Evm => write!(f, "evm"),
            ChainType::Solana => write!(f, "solana"),
        }
    }
}

/// Connected EVM account
#[async_trait]
pub trait EvmWallet: Send + Sync {
    /// Checksummed or lowercase `0x` address of the connected account
    async fn address(&self) -> Result<String, WalletError>;

    async fn chain_id(&self) -> Result<u64, WalletError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError>;

    async fn sign_typed_data(&self, request: &TypedDataRequest) -> Result<EvmSignature, WalletError>;

    /// EIP-191 `personal_sign` over the UTF-8 bytes of `message`
    async fn personal_sign(&self, message: &str) -> Result<EvmSignature, WalletError>;
}

/// Connected Solana account
#[async_trait]
pub trait SolanaWallet: Send + Sync {
    /// Base58 public key
    async fn public_key(&self) -> Result<String, WalletError>;

    /// Detached ed25519 signature over `message`
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError>;
}

/// A connected wallet of either family
#[derive(Clone, Copy)]
pub enum WalletHandle<'a> {
    Evm(&'a dyn EvmWallet),
    Solana(&'a dyn SolanaWallet),
}

impl<'a> WalletHandle<'a> {
    pub fn chain_type(&self) -> ChainType {
        match self {
            WalletHandle::Evm(_) => ChainType::Evm,
            WalletHandle::Solana(_) => ChainType::Solana,
        }
    }

    /// Account identifier on the wallet's chain.
    ///
    /// A wallet that cannot name its account, or names an empty one, is a
    /// validation failure: nothing can be signed for it. A locked wallet may
    /// never answer, so the lookup races `cancel`.
    pub async fn address(&self, cancel: &CancellationToken) -> Result<String, ExchangeError> {
        let lookup = async {
            match self {
                WalletHandle::Evm(w) => w.address().await,
                WalletHandle::Solana(w) => w.public_key().await,
            }
            .map_err(|e| ExchangeError::Validation(format!("no connected wallet address ({})", e)))
        };
        let address = with_cancel(cancel, lookup).await?;

        let address = address.trim().to_string();
        if address.is_empty() {
            return Err(ExchangeError::Validation(
                "no connected wallet address".to_string(),
            ));
        }
        Ok(address)
    }
}

impl std::fmt::Debug for WalletHandle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "WalletHandle({})", self.chain_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_4001_is_rejection_whatever_the_text() {
        let err = WalletError::new(Some(4001), "something odd");
        assert!(err.is_user_rejection());
        assert!(matches!(
            ExchangeError::from(err),
            ExchangeError::UserRejected(_)
        ));
    }

    #[test]
    fn test_substring_fallback_without_code() {
        for message in [
            "User rejected the request.",
            "MetaMask Tx Signature: User denied message signature.",
            "The user rejected the request",
            "user cancelled",
            "ACTION_REJECTED",
        ] {
            assert!(WalletError::new(None, message).is_user_rejection(), "{}", message);
        }
    }

    #[test]
    fn test_other_code_with_rejection_text_still_rejection() {
        let err = WalletError::new(Some(-32603), "Internal error: User denied");
        assert!(err.is_user_rejection());
    }

    #[test]
    fn test_unrecognised_error_falls_back_to_generic_message() {
        let err = ExchangeError::from(WalletError::new(Some(-32000), "ledger disconnected"));
        match err {
            ExchangeError::SigningFailed(msg) => {
                assert!(msg.contains("-32000"));
                assert!(msg.contains("ledger disconnected"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = ExchangeError::from(WalletError::new(None, ""));
        assert_eq!(
            err.to_string(),
            "Signing failed: wallet returned an unknown error"
        );
    }

    #[test]
    fn test_chain_type_display() {
        assert_eq!(ChainType::Evm.to_string(), "evm");
        assert_eq!(ChainType::Solana.to_string(), "solana");
    }
}
