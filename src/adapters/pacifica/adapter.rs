//! Pacifica linking flow
//!
//! The connected Solana wallet approves the builder code and binds a fresh
//! agent keypair. The agent then claims the referral code on its own
//! signature; that last step may fail without failing the link.

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::config::{PacificaConfig, AGENT_BIND_PATH, BUILDER_APPROVE_PATH, REFERRAL_CLAIM_PATH};
use super::signing::{OperationType, SignedOperation};
use super::types::expect_success;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::ExchangeCredential;
use crate::core::http::RestClient;
use crate::core::nonce::next_nonce_ms;
use crate::signing::{SigningRequest, SigningScheme};
use crate::wallet::{SolanaKeypair, SolanaWallet, WalletHandle};

/// Pacifica account linker
#[derive(Debug, Clone)]
pub struct PacificaAdapter {
    config: PacificaConfig,
    client: RestClient,
}

impl PacificaAdapter {
    pub fn new(config: PacificaConfig) -> Self {
        Self::with_client(config, RestClient::default())
    }

    pub fn with_client(config: PacificaConfig, client: RestClient) -> Self {
        Self { config, client }
    }

    /// Approve the builder code, bind a new agent, then try to claim the referral.
    ///
    /// Returns the agent public key as `api_key` and the base58 agent
    /// keypair as `api_secret`.
    #[tracing::instrument(skip_all, fields(venue = "pacifica", production = self.config.production))]
    pub async fn add_account(
        &self,
        wallet: &dyn SolanaWallet,
        cancel: &CancellationToken,
    ) -> ExchangeResult<ExchangeCredential> {
        self.config.validate()?;
        let account = WalletHandle::Solana(wallet).address(cancel).await?;
        let agent = SolanaKeypair::generate();
        let agent_pubkey = agent.public_key_base58();
        tracing::info!(wallet = %account, agent = %agent_pubkey, "Linking Pacifica account");

        let approve = self.operation(
            OperationType::ApproveBuilderCode,
            json!({
                "builder_code": self.config.builder_code,
                "max_fee_rate": self.config.max_fee_rate,
            }),
        );
        self.sign_and_submit(SigningScheme::SolanaMessage(wallet), &account, None, &approve, BUILDER_APPROVE_PATH, cancel)
            .await?;
        tracing::info!("Builder code approved");

        let bind = self.operation(
            OperationType::BindAgentWallet,
            json!({ "agent_wallet": agent_pubkey }),
        );
        self.sign_and_submit(SigningScheme::SolanaMessage(wallet), &account, None, &bind, AGENT_BIND_PATH, cancel)
            .await?;
        tracing::info!("Agent wallet bound");

        let claim = self.operation(
            OperationType::ClaimReferralCode,
            json!({ "code": self.config.referral_code() }),
        );
        match self
            .sign_and_submit(
                SigningScheme::SolanaMessage(&agent),
                &account,
                Some(&agent_pubkey),
                &claim,
                REFERRAL_CLAIM_PATH,
                cancel,
            )
            .await
        {
            Ok(_) => tracing::info!(code = %self.config.referral_code(), "Referral code claimed"),
            Err(ExchangeError::Cancelled) => return Err(ExchangeError::Cancelled),
            Err(e) => tracing::warn!(error = %e, "Referral claim failed, continuing"),
        }

        Ok(ExchangeCredential::new(agent_pubkey, agent.secret_key_base58()))
    }

    fn operation(&self, operation: OperationType, data: Value) -> SignedOperation {
        SignedOperation::new(operation, data, next_nonce_ms(), self.config.expiry_window_ms)
    }

    async fn sign_and_submit(
        &self,
        scheme: SigningScheme<'_>,
        account: &str,
        agent_wallet: Option<&str>,
        operation: &SignedOperation,
        path: &str,
        cancel: &CancellationToken,
    ) -> ExchangeResult<Value> {
        let signature = scheme
            .sign(&SigningRequest::SolanaMessage(operation.message_bytes()), cancel)
            .await?
            .to_base58()?;
        let body = operation.request_body(account, &signature, agent_wallet);
        tracing::debug!(operation = operation.operation.as_str(), "Submitting Pacifica operation");
        let response = self
            .client
            .post_json(&self.config.url(path), &body, &[], cancel)
            .await?;
        Ok(expect_success(&response)?.data)
    }
}

/// Link a Pacifica account with the default HTTP client
pub async fn add_pacifica_account(
    config: &PacificaConfig,
    wallet: &dyn SolanaWallet,
    cancel: &CancellationToken,
) -> ExchangeResult<ExchangeCredential> {
    PacificaAdapter::new(config.clone()).add_account(wallet, cancel).await
}
