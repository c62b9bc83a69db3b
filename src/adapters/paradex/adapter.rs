//! Paradex linking flow
//!
//! The EVM wallet signs the `STARK Key` message on the L1 chain Paradex
//! names in `/system/config`; the signature deterministically yields the
//! Starknet account. That account is onboarded, authenticated for a JWT,
//! and finally given a fresh random subkey, which is what gets returned.
//! Every step consumes the previous step's output, so the flow is strictly
//! sequential.

use serde_json::json;
use starknet_core::types::Felt;
use starknet_signers::SigningKey;
use tokio_util::sync::CancellationToken;

use super::config::ParadexConfig;
use super::signing::{
    auth_message, derive_account_address, onboarding_message, private_key_from_eth_signature,
    public_key, stark_key_request,
};
use super::types::{expect_success, AuthResponse, ParadexSystemConfig};
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::ExchangeCredential;
use crate::core::cancel::with_cancel;
use crate::core::http::RestClient;
use crate::core::logging::sanitize_signature;
use crate::core::nonce::current_time_secs;
use crate::signing::starknet::felt_to_hex;
use crate::signing::{SigningRequest, SigningScheme};
use crate::wallet::{EvmWallet, WalletHandle};

/// Starknet account derived from an EVM wallet
pub struct DerivedAccount {
    pub address: Felt,
    pub public_key: Felt,
    signing_key: SigningKey,
}

impl std::fmt::Debug for DerivedAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedAccount")
            .field("address", &felt_to_hex(&self.address))
            .field("public_key", &felt_to_hex(&self.public_key))
            .finish_non_exhaustive()
    }
}

/// Paradex account linker
#[derive(Debug, Clone)]
pub struct ParadexAdapter {
    config: ParadexConfig,
    client: RestClient,
}

impl ParadexAdapter {
    pub fn new(config: ParadexConfig) -> Self {
        Self::with_client(config, RestClient::default())
    }

    pub fn with_client(config: ParadexConfig, client: RestClient) -> Self {
        Self { config, client }
    }

    /// Derive, onboard and authenticate the wallet's Paradex account, then
    /// register a new subkey.
    ///
    /// Returns the Paradex account address as `api_key` and the subkey
    /// private key as `api_secret`.
    #[tracing::instrument(skip_all, fields(venue = "paradex", production = self.config.production))]
    pub async fn add_account(
        &self,
        wallet: &dyn EvmWallet,
        cancel: &CancellationToken,
    ) -> ExchangeResult<ExchangeCredential> {
        self.config.validate()?;
        let eth_address = WalletHandle::Evm(wallet).address(cancel).await?;

        let system = self.fetch_system_config(cancel).await?;
        tracing::info!(
            l1_chain_id = system.l1_chain_id,
            starknet_chain_id = %system.starknet_chain_id,
            "Fetched Paradex system config"
        );

        self.ensure_chain(wallet, system.l1_chain_id, cancel).await?;

        let account = self.derive_account(wallet, &system, cancel).await?;
        let account_hex = felt_to_hex(&account.address);
        tracing::info!(wallet = %eth_address, account = %account_hex, "Derived Paradex account");

        self.onboard(&eth_address, &account, &system.starknet_chain_id, cancel)
            .await?;
        tracing::info!("Account onboarded");

        let jwt = self
            .authenticate(&account, &system.starknet_chain_id, cancel)
            .await?;
        tracing::info!("Authenticated");

        let subkey = SigningKey::from_random();
        self.register_subkey(&jwt, &subkey, cancel).await?;
        tracing::info!(name = %self.config.subkey_name, "Subkey registered");

        Ok(ExchangeCredential::new(
            account_hex,
            felt_to_hex(&subkey.secret_scalar()),
        ))
    }

    /// `GET /system/config`
    pub async fn fetch_system_config(
        &self,
        cancel: &CancellationToken,
    ) -> ExchangeResult<ParadexSystemConfig> {
        let url = format!("{}/system/config", self.config.rest_base_url());
        let response = self.client.get(&url, cancel).await?;
        expect_success(&response, "system config")?;
        response.json()
    }

    /// Move the wallet to `chain_id` unless it is already there
    async fn ensure_chain(
        &self,
        wallet: &dyn EvmWallet,
        chain_id: u64,
        cancel: &CancellationToken,
    ) -> ExchangeResult<()> {
        let current = with_cancel(cancel, async {
            wallet.chain_id().await.map_err(|e| ExchangeError::ChainSwitchFailed {
                chain_id,
                reason: format!("could not read current chain ({})", e),
            })
        })
        .await?;
        if current == chain_id {
            return Ok(());
        }

        tracing::info!(from = current, to = chain_id, "Switching wallet chain");
        with_cancel(cancel, async {
            wallet.switch_chain(chain_id).await.map_err(|e| {
                if e.is_user_rejection() {
                    ExchangeError::from(e)
                } else {
                    ExchangeError::ChainSwitchFailed {
                        chain_id,
                        reason: e.to_string(),
                    }
                }
            })
        })
        .await
    }

    /// Have the wallet sign `STARK Key` and derive the Starknet account from it.
    ///
    /// The same wallet always lands on the same account.
    pub async fn derive_account(
        &self,
        wallet: &dyn EvmWallet,
        system: &ParadexSystemConfig,
        cancel: &CancellationToken,
    ) -> ExchangeResult<DerivedAccount> {
        let request = SigningRequest::EvmTypedData(stark_key_request(system.l1_chain_id));
        let signature = SigningScheme::EvmTypedData(wallet)
            .sign(&request, cancel)
            .await?;
        let signature = signature.as_evm()?;
        tracing::debug!(signature = %sanitize_signature(&signature.to_hex()), "STARK Key signed");

        let private_key = private_key_from_eth_signature(signature)?;
        let public_key = public_key(private_key);
        let address = derive_account_address(
            public_key,
            &system.paraclear_account_hash,
            &system.paraclear_account_proxy_hash,
        )?;
        Ok(DerivedAccount {
            address,
            public_key,
            signing_key: SigningKey::from_secret_scalar(private_key),
        })
    }

    /// `POST /onboarding`; any non-2xx answer aborts the flow
    async fn onboard(
        &self,
        eth_address: &str,
        account: &DerivedAccount,
        starknet_chain_id: &str,
        cancel: &CancellationToken,
    ) -> ExchangeResult<()> {
        let request = SigningRequest::StarknetTypedData {
            data: onboarding_message(starknet_chain_id),
            account: account.address,
        };
        let signature = SigningScheme::StarknetTypedData(&account.signing_key)
            .sign(&request, cancel)
            .await?;

        let mut body = json!({ "public_key": felt_to_hex(&account.public_key) });
        if let Some(code) = self.config.referral_code.as_deref().filter(|c| !c.is_empty()) {
            body["referral_code"] = json!(code);
        }
        let headers = [
            ("PARADEX-ETHEREUM-ACCOUNT", eth_address.to_string()),
            ("PARADEX-STARKNET-ACCOUNT", felt_to_hex(&account.address)),
            ("PARADEX-STARKNET-SIGNATURE", signature.to_starknet_header()?),
        ];
        let url = format!("{}/onboarding", self.config.rest_base_url());
        let response = self.client.post_json(&url, &body, &headers, cancel).await?;
        expect_success(&response, "onboarding")
    }

    /// `POST /auth`, returning the JWT
    async fn authenticate(
        &self,
        account: &DerivedAccount,
        starknet_chain_id: &str,
        cancel: &CancellationToken,
    ) -> ExchangeResult<String> {
        let timestamp = current_time_secs();
        let (data, expiration) = auth_message(starknet_chain_id, timestamp);
        let request = SigningRequest::StarknetTypedData {
            data,
            account: account.address,
        };
        let signature = SigningScheme::StarknetTypedData(&account.signing_key)
            .sign(&request, cancel)
            .await?;

        let headers = [
            ("PARADEX-STARKNET-ACCOUNT", felt_to_hex(&account.address)),
            ("PARADEX-STARKNET-SIGNATURE", signature.to_starknet_header()?),
            ("PARADEX-TIMESTAMP", timestamp.to_string()),
            ("PARADEX-SIGNATURE-EXPIRATION", expiration.to_string()),
        ];
        let url = format!("{}/auth", self.config.rest_base_url());
        let response = self.client.post_json(&url, &json!({}), &headers, cancel).await?;
        expect_success(&response, "authentication")?;

        response
            .json::<AuthResponse>()?
            .jwt_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ExchangeError::InvalidResponse("auth response has no jwt_token".to_string()))
    }

    /// `POST /account/keys/subkeys` with the JWT as bearer
    async fn register_subkey(
        &self,
        jwt: &str,
        subkey: &SigningKey,
        cancel: &CancellationToken,
    ) -> ExchangeResult<()> {
        let body = json!({
            "name": self.config.subkey_name,
            "public_key": felt_to_hex(&subkey.verifying_key().scalar()),
            "key_type": "starknet",
        });
        let headers = [("Authorization", format!("Bearer {}", jwt))];
        let url = format!("{}/account/keys/subkeys", self.config.rest_base_url());
        let response = self.client.post_json(&url, &body, &headers, cancel).await?;
        expect_success(&response, "subkey registration")
    }
}

/// Link a Paradex account with the default HTTP client
pub async fn add_paradex_account(
    config: &ParadexConfig,
    wallet: &dyn EvmWallet,
    cancel: &CancellationToken,
) -> ExchangeResult<ExchangeCredential> {
    ParadexAdapter::new(config.clone()).add_account(wallet, cancel).await
}
