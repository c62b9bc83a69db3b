//! Signing scheme family
//!
//! Each venue flow builds a `SigningRequest` and hands it to the
//! `SigningScheme` bound to the right signer. The flows only orchestrate;
//! all signing goes through `SigningScheme::sign`.

pub mod eip712;
pub mod starknet;

use starknet_core::types::Felt;
use starknet_signers::SigningKey;
use tokio_util::sync::CancellationToken;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::core::cancel::with_cancel;
use crate::wallet::{EvmWallet, SolanaWallet};

pub use self::eip712::{EvmDomain, EvmSignature, FieldValue, TypedDataRequest, TypedStruct};
pub use self::starknet::{FeltValue, StarknetDomain, StarknetTypedData};

/// The exact message about to be signed
#[derive(Debug, Clone)]
pub enum SigningRequest {
    EvmTypedData(TypedDataRequest),
    EvmPersonalSign(String),
    SolanaMessage(Vec<u8>),
    StarknetTypedData {
        data: StarknetTypedData,
        account: Felt,
    },
}

impl SigningRequest {
    fn kind(&self) -> &'static str {
        match self {
            SigningRequest::EvmTypedData(_) => "evm_typed_data",
            SigningRequest::EvmPersonalSign(_) => "evm_personal_sign",
            SigningRequest::SolanaMessage(_) => "solana_message",
            SigningRequest::StarknetTypedData { .. } => "starknet_typed_data",
        }
    }
}

/// Output of a signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Evm(EvmSignature),
    Solana(Vec<u8>),
    Starknet { r: Felt, s: Felt },
}

impl Signature {
    pub fn as_evm(&self) -> ExchangeResult<&EvmSignature> {
        match self {
            Signature::Evm(sig) => Ok(sig),
            _ => Err(ExchangeError::SigningFailed(
                "expected an EVM signature".to_string(),
            )),
        }
    }

    /// Base58 text of a Solana signature
    pub fn to_base58(&self) -> ExchangeResult<String> {
        match self {
            Signature::Solana(bytes) => Ok(bs58::encode(bytes).into_string()),
            _ => Err(ExchangeError::SigningFailed(
                "expected a Solana signature".to_string(),
            )),
        }
    }

    /// `["<r>","<s>"]` header value of a Starknet signature
    pub fn to_starknet_header(&self) -> ExchangeResult<String> {
        match self {
            Signature::Starknet { r, s } => Ok(starknet::signature_header(r, s)),
            _ => Err(ExchangeError::SigningFailed(
                "expected a Starknet signature".to_string(),
            )),
        }
    }
}

/// A signer together with the message family it signs
#[derive(Clone, Copy)]
pub enum SigningScheme<'a> {
    EvmTypedData(&'a dyn EvmWallet),
    EvmPersonalSign(&'a dyn EvmWallet),
    SolanaMessage(&'a dyn SolanaWallet),
    StarknetTypedData(&'a SigningKey),
}

impl<'a> SigningScheme<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            SigningScheme::EvmTypedData(_) => "evm_typed_data",
            SigningScheme::EvmPersonalSign(_) => "evm_personal_sign",
            SigningScheme::SolanaMessage(_) => "solana_message",
            SigningScheme::StarknetTypedData(_) => "starknet_typed_data",
        }
    }

    /// Sign `request`, failing with `Validation` if it belongs to another scheme.
    ///
    /// Wallet prompts race against `cancel`; a wallet error is classified
    /// into `UserRejected` or the generic `SigningFailed`.
    pub async fn sign(
        &self,
        request: &SigningRequest,
        cancel: &CancellationToken,
    ) -> ExchangeResult<Signature> {
        tracing::debug!(scheme = self.name(), "Requesting signature");
        match (self, request) {
            (SigningScheme::EvmTypedData(wallet), SigningRequest::EvmTypedData(typed)) => {
                let sig = with_cancel(cancel, async {
                    wallet.sign_typed_data(typed).await.map_err(ExchangeError::from)
                })
                .await?;
                Ok(Signature::Evm(sig))
            }
            (SigningScheme::EvmPersonalSign(wallet), SigningRequest::EvmPersonalSign(message)) => {
                let sig = with_cancel(cancel, async {
                    wallet.personal_sign(message).await.map_err(ExchangeError::from)
                })
                .await?;
                Ok(Signature::Evm(sig))
            }
            (SigningScheme::SolanaMessage(wallet), SigningRequest::SolanaMessage(message)) => {
                let sig = with_cancel(cancel, async {
                    wallet.sign_message(message).await.map_err(ExchangeError::from)
                })
                .await?;
                if sig.len() != 64 {
                    return Err(ExchangeError::SigningFailed(format!(
                        "ed25519 signature must be 64 bytes, wallet returned {}",
                        sig.len()
                    )));
                }
                Ok(Signature::Solana(sig))
            }
            (SigningScheme::StarknetTypedData(key), SigningRequest::StarknetTypedData { data, account }) => {
                if cancel.is_cancelled() {
                    return Err(ExchangeError::Cancelled);
                }
                let (r, s) = starknet::sign_typed_data(key, data, *account)?;
                Ok(Signature::Starknet { r, s })
            }
            (scheme, request) => Err(ExchangeError::Validation(format!(
                "{} cannot sign a {} request",
                scheme.name(),
                request.kind()
            ))),
        }
    }
}

impl std::fmt::Debug for SigningScheme<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningScheme({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{LocalEvmWallet, SolanaKeypair};

    #[tokio::test]
    async fn test_mismatched_request_is_validation_error() {
        let wallet = LocalEvmWallet::random(1);
        let scheme = SigningScheme::EvmPersonalSign(&wallet);
        let cancel = CancellationToken::new();
        let result = scheme
            .sign(&SigningRequest::SolanaMessage(b"hi".to_vec()), &cancel)
            .await;
        assert!(matches!(result, Err(ExchangeError::Validation(_))));
    }

    #[tokio::test]
    async fn test_solana_scheme_produces_base58() {
        let keypair = SolanaKeypair::generate();
        let scheme = SigningScheme::SolanaMessage(&keypair);
        let cancel = CancellationToken::new();
        let sig = scheme
            .sign(&SigningRequest::SolanaMessage(b"hello".to_vec()), &cancel)
            .await
            .unwrap();
        let encoded = sig.to_base58().unwrap();
        assert_eq!(bs58::decode(encoded).into_vec().unwrap().len(), 64);
        assert!(sig.as_evm().is_err());
    }

    #[tokio::test]
    async fn test_cancelled_before_signing() {
        let wallet = LocalEvmWallet::random(1);
        let scheme = SigningScheme::EvmPersonalSign(&wallet);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = scheme
            .sign(&SigningRequest::EvmPersonalSign("hi".into()), &cancel)
            .await;
        assert!(matches!(result, Err(ExchangeError::Cancelled)));
    }

    #[tokio::test]
    async fn test_starknet_scheme_header() {
        let key = SigningKey::from_secret_scalar(Felt::from(7u64));
        let data = StarknetTypedData::new(
            StarknetDomain {
                name: "Paradex".into(),
                chain_id: "PRIVATE_SN_POTC_SEPOLIA".into(),
                version: 1,
            },
            "Constant",
        )
        .field("action", FeltValue::Short("Onboarding".into()));
        let scheme = SigningScheme::StarknetTypedData(&key);
        let sig = scheme
            .sign(
                &SigningRequest::StarknetTypedData {
                    data,
                    account: Felt::from(1u64),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        let header = sig.to_starknet_header().unwrap();
        assert!(header.starts_with("[\"") && header.ends_with("\"]"));
        assert!(!header.contains("0x"));
    }
}
