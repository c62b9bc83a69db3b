//! Aster linking flow
//!
//! Login first (registers the user and the referral), then mint a fresh
//! broker API key. Each step spends its own server nonce, signed as
//! `"You are signing into Astherus <nonce>"` with `personal_sign` on EVM or
//! `signMessage` on Solana.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;

use super::config::{AsterConfig, DESC_SUFFIX_LEN, SOLANA_NETWORK};
use super::types::{expect_success, extract_api_key, extract_nonce, NonceAction};
use crate::adapters::errors::ExchangeResult;
use crate::adapters::types::ExchangeCredential;
use crate::core::http::RestClient;
use crate::signing::{SigningRequest, SigningScheme};
use crate::wallet::{ChainType, WalletHandle};

pub const SIGN_IN_MESSAGE_PREFIX: &str = "You are signing into Astherus";

/// Message signed for `nonce`
pub fn sign_in_message(nonce: &str) -> String {
    format!("{} {}", SIGN_IN_MESSAGE_PREFIX, nonce)
}

/// `<prefix><8 random alphanumerics>`
pub fn api_key_description(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DESC_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{}{}", prefix, suffix)
}

/// Aster account linker
#[derive(Debug, Clone)]
pub struct AsterAdapter {
    config: AsterConfig,
    client: RestClient,
}

impl AsterAdapter {
    pub fn new(config: AsterConfig) -> Self {
        Self::with_client(config, RestClient::default())
    }

    pub fn with_client(config: AsterConfig, client: RestClient) -> Self {
        Self { config, client }
    }

    /// Log in, then create and return a broker API key pair
    #[tracing::instrument(skip_all, fields(venue = "aster", chain = %wallet.chain_type()))]
    pub async fn add_account(
        &self,
        wallet: WalletHandle<'_>,
        cancel: &CancellationToken,
    ) -> ExchangeResult<ExchangeCredential> {
        self.config.validate()?;
        let address = wallet.address(cancel).await?;
        let network = match wallet.chain_type() {
            ChainType::Solana => Some(SOLANA_NETWORK),
            ChainType::Evm => None,
        };
        tracing::info!(wallet = %address, "Linking Aster account");

        let nonce = self.fetch_nonce(&address, NonceAction::Login, network, cancel).await?;
        let signature = self.sign_nonce(wallet, &nonce, cancel).await?;
        let mut login = Map::new();
        login.insert("signature".into(), json!(signature));
        login.insert("sourceAddr".into(), json!(address));
        login.insert("agentCode".into(), json!(self.config.agent_code));
        add_network(&mut login, network);
        let response = self
            .client
            .post_json(&self.config.login_url(), &Value::Object(login), &[], cancel)
            .await?;
        expect_success(&response)?;
        tracing::info!("Aster login accepted");

        let nonce = self
            .fetch_nonce(&address, NonceAction::CreateApiKey, network, cancel)
            .await?;
        let signature = self.sign_nonce(wallet, &nonce, cancel).await?;
        let desc = api_key_description(&self.config.desc_prefix);
        let mut create = Map::new();
        create.insert("sourceAddr".into(), json!(address));
        create.insert("signature".into(), json!(signature));
        create.insert("type".into(), json!(NonceAction::CreateApiKey.as_str()));
        create.insert("desc".into(), json!(desc));
        create.insert("ip".into(), json!(""));
        create.insert("sourceCode".into(), json!(self.config.source_code));
        add_network(&mut create, network);
        let response = self
            .client
            .post_json(&self.config.create_api_key_url(), &Value::Object(create), &[], cancel)
            .await?;
        let (api_key, api_secret) = extract_api_key(&expect_success(&response)?)?;
        tracing::info!(desc = %desc, "Aster API key created");

        Ok(ExchangeCredential::new(api_key, api_secret))
    }

    async fn fetch_nonce(
        &self,
        address: &str,
        action: NonceAction,
        network: Option<&str>,
        cancel: &CancellationToken,
    ) -> ExchangeResult<String> {
        let mut body = Map::new();
        body.insert("sourceAddr".into(), json!(address));
        body.insert("type".into(), json!(action.as_str()));
        add_network(&mut body, network);
        let response = self
            .client
            .post_json(&self.config.nonce_url(), &Value::Object(body), &[], cancel)
            .await?;
        let nonce = extract_nonce(&expect_success(&response)?)?;
        tracing::debug!(action = action.as_str(), "Aster nonce received");
        Ok(nonce)
    }

    /// Signature text for the login/create body: `0x` hex on EVM, base58 on Solana
    async fn sign_nonce(
        &self,
        wallet: WalletHandle<'_>,
        nonce: &str,
        cancel: &CancellationToken,
    ) -> ExchangeResult<String> {
        let message = sign_in_message(nonce);
        match wallet {
            WalletHandle::Evm(w) => {
                let sig = SigningScheme::EvmPersonalSign(w)
                    .sign(&SigningRequest::EvmPersonalSign(message), cancel)
                    .await?;
                Ok(sig.as_evm()?.to_hex())
            }
            WalletHandle::Solana(w) => {
                let sig = SigningScheme::SolanaMessage(w)
                    .sign(&SigningRequest::SolanaMessage(message.into_bytes()), cancel)
                    .await?;
                sig.to_base58()
            }
        }
    }
}

fn add_network(body: &mut Map<String, Value>, network: Option<&str>) {
    if let Some(network) = network {
        body.insert("network".into(), json!(network));
    }
}

/// Link an Aster account with the default HTTP client
pub async fn add_aster_account(
    config: &AsterConfig,
    wallet: WalletHandle<'_>,
    cancel: &CancellationToken,
) -> ExchangeResult<ExchangeCredential> {
    AsterAdapter::new(config.clone()).add_account(wallet, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::errors::ExchangeError;
    use crate::wallet::SolanaKeypair;
    use mockito::Matcher;

    #[test]
    fn test_sign_in_message() {
        assert_eq!(sign_in_message("42"), "You are signing into Astherus 42");
    }

    #[test]
    fn test_description_has_random_suffix() {
        let a = api_key_description("treadfi-");
        let b = api_key_description("treadfi-");
        assert_eq!(a.len(), "treadfi-".len() + DESC_SUFFIX_LEN);
        assert!(a["treadfi-".len()..].chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_solana_wallet_tags_every_request() {
        let mut server = mockito::Server::new_async().await;
        let keypair = SolanaKeypair::generate();
        let address = keypair.public_key_base58();

        let nonce_mock = server
            .mock("POST", "/get-nonce")
            .match_body(Matcher::PartialJson(json!({"sourceAddr": address, "network": "SOL"})))
            .with_body(r#"{"success":true,"data":{"nonce":7}}"#)
            .expect(2)
            .create_async()
            .await;
        let login_mock = server
            .mock("POST", "/ae/login")
            .match_body(Matcher::PartialJson(json!({"network": "SOL", "agentCode": "248Dbf"})))
            .with_body(r#"{"success":true,"data":{}}"#)
            .create_async()
            .await;
        let create_mock = server
            .mock("POST", "/broker-create-api-key")
            .match_body(Matcher::PartialJson(json!({"network": "SOL", "sourceCode": "ae", "ip": ""})))
            .with_body(r#"{"success":true,"data":{"apiKey":"key-1","apiSecret":"secret-1"}}"#)
            .create_async()
            .await;

        let adapter = AsterAdapter::new(AsterConfig {
            api_url: Some(server.url()),
            ..Default::default()
        });
        let cred = adapter
            .add_account(WalletHandle::Solana(&keypair), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(cred, ExchangeCredential::new("key-1", "secret-1"));

        nonce_mock.assert_async().await;
        login_mock.assert_async().await;
        create_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_failure_stops_before_key_creation() {
        let mut server = mockito::Server::new_async().await;
        let keypair = SolanaKeypair::generate();
        server
            .mock("POST", "/get-nonce")
            .with_body(r#"{"success":true,"data":{"nonce":"1"}}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/ae/login")
            .with_body(r#"{"success":false,"message":"invalid signature"}"#)
            .create_async()
            .await;
        let create_mock = server
            .mock("POST", "/broker-create-api-key")
            .expect(0)
            .create_async()
            .await;

        let adapter = AsterAdapter::new(AsterConfig {
            api_url: Some(server.url()),
            ..Default::default()
        });
        let err = adapter
            .add_account(WalletHandle::Solana(&keypair), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::ServerRejected { .. }));
        create_mock.assert_async().await;
    }
}
