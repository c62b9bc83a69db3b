//! Hyperliquid linking flow and transfer actions
//!
//! Linking authorizes a freshly generated agent wallet to trade for the
//! connected wallet, after approving the platform's builder fee. Both
//! approvals are user-signed EIP-712 actions posted to `/exchange`.

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use super::config::HyperliquidConfig;
use super::signing::{
    agent_name, normalize_address, normalize_amount, AgentApproval, SendAssetParams, UserAction,
};
use super::types::parse_exchange_response;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::types::ExchangeCredential;
use crate::core::cancel::with_cancel;
use crate::core::http::RestClient;
use crate::core::nonce::next_nonce_ms;
use crate::signing::{SigningRequest, SigningScheme};
use crate::wallet::{EvmWallet, LocalEvmWallet, WalletHandle};

/// Hyperliquid account linker
#[derive(Debug, Clone)]
pub struct HyperliquidAdapter {
    config: HyperliquidConfig,
    client: RestClient,
}

impl HyperliquidAdapter {
    pub fn new(config: HyperliquidConfig) -> Self {
        Self::with_client(config, RestClient::default())
    }

    pub fn with_client(config: HyperliquidConfig, client: RestClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &HyperliquidConfig {
        &self.config
    }

    /// Approve the builder fee, then approve a new agent wallet.
    ///
    /// Returns the main wallet address as `api_key` and the agent private
    /// key as `api_secret`. The agent approval is never attempted unless the
    /// builder approval succeeded.
    #[tracing::instrument(skip_all, fields(venue = "hyperliquid", production = self.config.production))]
    pub async fn add_account(
        &self,
        wallet: &dyn EvmWallet,
        builder_address: &str,
        vault_address: Option<&str>,
        cancel: &CancellationToken,
    ) -> ExchangeResult<ExchangeCredential> {
        self.config.validate()?;
        let builder = normalize_address(builder_address, "builder address")?;
        let vault = vault_address
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| normalize_address(v, "vault address"))
            .transpose()?;
        let main_address = WalletHandle::Evm(wallet).address(cancel).await?;
        let chain_id = self.connected_chain(wallet, cancel).await?;

        let agent = LocalEvmWallet::random(chain_id);
        let approval = AgentApproval {
            agent_address: agent.checksum_address().to_lowercase(),
            agent_name: agent_name(
                &self.config.agent_name_prefix,
                vault.as_deref().unwrap_or(&main_address),
            ),
        };
        tracing::info!(
            wallet = %main_address,
            agent = %approval.agent_address,
            agent_name = %approval.agent_name,
            chain_id,
            "Linking Hyperliquid account"
        );

        let builder_fee = UserAction::ApproveBuilderFee {
            max_fee_rate: self.config.max_fee_rate.clone(),
            builder,
            nonce: next_nonce_ms(),
        };
        self.sign_and_submit(wallet, chain_id, &builder_fee, cancel).await?;
        tracing::info!("Builder fee approved");

        let approve_agent = UserAction::ApproveAgent {
            agent: approval,
            nonce: next_nonce_ms(),
        };
        self.sign_and_submit(wallet, chain_id, &approve_agent, cancel).await?;
        tracing::info!("Agent wallet approved");

        Ok(ExchangeCredential::new(main_address, agent.private_key_hex()))
    }

    /// Withdraw USDC to an address on Arbitrum (`withdraw3`)
    #[tracing::instrument(skip_all, fields(venue = "hyperliquid"))]
    pub async fn withdraw(
        &self,
        wallet: &dyn EvmWallet,
        destination: &str,
        amount: &str,
        cancel: &CancellationToken,
    ) -> ExchangeResult<Value> {
        let action = UserAction::Withdraw {
            destination: normalize_address(destination, "destination")?,
            amount: normalize_amount(amount)?,
            time: next_nonce_ms(),
        };
        let chain_id = self.connected_chain(wallet, cancel).await?;
        self.sign_and_submit(wallet, chain_id, &action, cancel).await
    }

    /// Send a spot token to another Hyperliquid user (`spotSend`)
    #[tracing::instrument(skip_all, fields(venue = "hyperliquid", token = %token))]
    pub async fn spot_send(
        &self,
        wallet: &dyn EvmWallet,
        destination: &str,
        token: &str,
        amount: &str,
        cancel: &CancellationToken,
    ) -> ExchangeResult<Value> {
        if token.trim().is_empty() {
            return Err(ExchangeError::Validation("token is required".to_string()));
        }
        let action = UserAction::SpotSend {
            destination: normalize_address(destination, "destination")?,
            token: token.trim().to_string(),
            amount: normalize_amount(amount)?,
            time: next_nonce_ms(),
        };
        let chain_id = self.connected_chain(wallet, cancel).await?;
        self.sign_and_submit(wallet, chain_id, &action, cancel).await
    }

    /// Move USDC between dexes, sub-accounts or users (`sendAsset`)
    #[tracing::instrument(skip_all, fields(venue = "hyperliquid"))]
    pub async fn send_asset(
        &self,
        wallet: &dyn EvmWallet,
        params: SendAssetParams,
        cancel: &CancellationToken,
    ) -> ExchangeResult<Value> {
        let from_sub_account = if params.from_sub_account.trim().is_empty() {
            String::new()
        } else {
            normalize_address(&params.from_sub_account, "source sub-account")?
        };
        let action = UserAction::SendAsset {
            params: SendAssetParams {
                destination: normalize_address(&params.destination, "destination")?,
                source_dex: params.source_dex.trim().to_string(),
                destination_dex: params.destination_dex.trim().to_string(),
                amount: normalize_amount(&params.amount)?,
                from_sub_account,
            },
            nonce: next_nonce_ms(),
        };
        let chain_id = self.connected_chain(wallet, cancel).await?;
        self.sign_and_submit(wallet, chain_id, &action, cancel).await
    }

    async fn connected_chain(
        &self,
        wallet: &dyn EvmWallet,
        cancel: &CancellationToken,
    ) -> ExchangeResult<u64> {
        with_cancel(cancel, async {
            wallet
                .chain_id()
                .await
                .map_err(|e| ExchangeError::Validation(format!("could not read wallet chain ({})", e)))
        })
        .await
    }

    /// Sign `action` with the main wallet and POST it to `/exchange`
    async fn sign_and_submit(
        &self,
        wallet: &dyn EvmWallet,
        chain_id: u64,
        action: &UserAction,
        cancel: &CancellationToken,
    ) -> ExchangeResult<Value> {
        let hyperliquid_chain = self.config.hyperliquid_chain();
        let request = SigningRequest::EvmTypedData(action.signing_request(hyperliquid_chain, chain_id)?);
        let signature = SigningScheme::EvmTypedData(wallet)
            .sign(&request, cancel)
            .await?;

        let body = json!({
            "action": action.to_action_json(hyperliquid_chain, chain_id),
            "nonce": action.nonce(),
            "signature": signature.as_evm()?.to_rsv_json(),
        });
        let url = format!("{}/exchange", self.config.rest_base_url());
        tracing::info!(action = action.action_type(), nonce = action.nonce(), "Submitting Hyperliquid action");
        let response = self.client.post_json(&url, &body, &[], cancel).await?;
        parse_exchange_response(&response)
    }
}

/// Link a Hyperliquid account with the default HTTP client
pub async fn add_hyperliquid_account(
    config: &HyperliquidConfig,
    wallet: &dyn EvmWallet,
    builder_address: &str,
    vault_address: Option<&str>,
    cancel: &CancellationToken,
) -> ExchangeResult<ExchangeCredential> {
    HyperliquidAdapter::new(config.clone())
        .add_account(wallet, builder_address, vault_address, cancel)
        .await
}

/// Withdraw USDC from Hyperliquid to `destination`
pub async fn withdraw_from_hyperliquid(
    config: &HyperliquidConfig,
    wallet: &dyn EvmWallet,
    destination: &str,
    amount: &str,
    cancel: &CancellationToken,
) -> ExchangeResult<Value> {
    HyperliquidAdapter::new(config.clone())
        .withdraw(wallet, destination, amount, cancel)
        .await
}

/// Send a spot token to another Hyperliquid user
pub async fn spot_send_from_hyperliquid(
    config: &HyperliquidConfig,
    wallet: &dyn EvmWallet,
    destination: &str,
    token: &str,
    amount: &str,
    cancel: &CancellationToken,
) -> ExchangeResult<Value> {
    HyperliquidAdapter::new(config.clone())
        .spot_send(wallet, destination, token, amount, cancel)
        .await
}

pub async fn send_asset(
    config: &HyperliquidConfig,
    wallet: &dyn EvmWallet,
    params: SendAssetParams,
    cancel: &CancellationToken,
) -> ExchangeResult<Value> {
    HyperliquidAdapter::new(config.clone())
        .send_asset(wallet, params, cancel)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const BUILDER: &str = "0x1924b8561eef20e70ede628a296175d358be80e5";

    fn adapter(url: &str) -> HyperliquidAdapter {
        HyperliquidAdapter::new(HyperliquidConfig {
            api_url: Some(url.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_missing_builder_fails_before_network() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/exchange").expect(0).create_async().await;
        let wallet = LocalEvmWallet::random(42161);

        let result = adapter(&server.url())
            .add_account(&wallet, "  ", None, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ExchangeError::Validation(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_vault_address_drives_agent_name() {
        let mut server = mockito::Server::new_async().await;
        let builder_mock = server
            .mock("POST", "/exchange")
            .match_body(Matcher::PartialJson(json!({"action": {"type": "approveBuilderFee"}})))
            .with_body(r#"{"status":"ok","response":{"type":"default"}}"#)
            .create_async()
            .await;
        let agent_mock = server
            .mock("POST", "/exchange")
            .match_body(Matcher::PartialJson(json!({
                "action": {"type": "approveAgent", "agentName": "tread-296175d358"}
            })))
            .with_body(r#"{"status":"ok","response":{"type":"default"}}"#)
            .create_async()
            .await;
        let wallet = LocalEvmWallet::random(42161);

        let cred = adapter(&server.url())
            .add_account(
                &wallet,
                BUILDER,
                Some("0x1924B8561EEF20E70EDE628A296175D358BE80E5"),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(cred.api_key, wallet.checksum_address());
        builder_mock.assert_async().await;
        agent_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_withdraw_posts_withdraw3() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/exchange")
            .match_body(Matcher::PartialJson(json!({
                "action": {
                    "type": "withdraw3",
                    "destination": BUILDER,
                    "amount": "12.5",
                    "hyperliquidChain": "Mainnet",
                    "signatureChainId": "0xa4b1"
                }
            })))
            .with_body(r#"{"status":"ok","response":{"type":"default"}}"#)
            .create_async()
            .await;
        let wallet = LocalEvmWallet::random(42161);

        let response = adapter(&server.url())
            .withdraw(&wallet, BUILDER, "12.50", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response["type"], "default");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_spot_send_rejects_bad_amount_locally() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("POST", "/exchange").expect(0).create_async().await;
        let wallet = LocalEvmWallet::random(42161);

        let result = adapter(&server.url())
            .spot_send(&wallet, BUILDER, "PURR:0xc1fb593aeffbeb02f85e0308e9956a90", "0", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(ExchangeError::Validation(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_asset_fixes_token_to_usdc() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/exchange")
            .match_body(Matcher::PartialJson(json!({
                "action": {"type": "sendAsset", "token": "USDC", "sourceDex": "", "destinationDex": "spot", "fromSubAccount": ""}
            })))
            .with_body(r#"{"status":"ok","response":{"type":"default"}}"#)
            .create_async()
            .await;
        let wallet = LocalEvmWallet::random(42161);

        adapter(&server.url())
            .send_asset(
                &wallet,
                SendAssetParams {
                    destination: BUILDER.to_string(),
                    destination_dex: "spot".to_string(),
                    amount: "3".to_string(),
                    ..Default::default()
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
