//! EVM wallet over a raw EIP-1193 `request({method, params})` provider

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{EvmWallet, WalletError};
use crate::signing::eip712::{EvmSignature, TypedDataRequest};

/// Raw JSON-RPC capability of an injected or remote wallet
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;
}

/// `EvmWallet` implemented on top of an `Eip1193Provider`
pub struct JsonRpcWallet<P> {
    provider: P,
}

impl<P: Eip1193Provider> JsonRpcWallet<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn request_string(&self, method: &str, params: Value) -> Result<String, WalletError> {
        match self.provider.request(method, params).await? {
            Value::String(s) => Ok(s),
            other => Err(WalletError::new(
                None,
                format!("{} returned unexpected value: {}", method, other),
            )),
        }
    }
}

#[async_trait]
impl<P: Eip1193Provider> EvmWallet for JsonRpcWallet<P> {
    async fn address(&self) -> Result<String, WalletError> {
        let accounts = self.provider.request("eth_accounts", json!([])).await?;
        accounts
            .as_array()
            .and_then(|a| a.first())
            .and_then(|a| a.as_str())
            .map(str::to_string)
            .ok_or_else(|| WalletError::new(None, "wallet exposes no account"))
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        let raw = self.provider.request("eth_chainId", json!([])).await?;
        parse_chain_id(&raw)
            .ok_or_else(|| WalletError::new(None, format!("unreadable chain id: {}", raw)))
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), WalletError> {
        self.provider
            .request(
                "wallet_switchEthereumChain",
                json!([{ "chainId": format!("0x{:x}", chain_id) }]),
            )
            .await?;
        Ok(())
    }

    async fn sign_typed_data(&self, request: &TypedDataRequest) -> Result<EvmSignature, WalletError> {
        let address = self.address().await?;
        let payload = request.to_json().to_string();
        let sig = self
            .request_string("eth_signTypedData_v4", json!([address, payload]))
            .await?;
        EvmSignature::from_hex(&sig).map_err(|e| WalletError::new(None, e.to_string()))
    }

    async fn personal_sign(&self, message: &str) -> Result<EvmSignature, WalletError> {
        let address = self.address().await?;
        let sig = self
            .request_string("personal_sign", json!([message, address]))
            .await?;
        EvmSignature::from_hex(&sig).map_err(|e| WalletError::new(None, e.to_string()))
    }
}

/// `"0xa4b1"`, `"42161"` or `42161`
fn parse_chain_id(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => match s.strip_prefix("0x") {
            Some(hex) => u64::from_str_radix(hex, 16).ok(),
            None => s.parse().ok(),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Provider that records calls and answers from a fixed script
    struct ScriptedProvider {
        calls: Mutex<Vec<(String, Value)>>,
        signature: Result<String, WalletError>,
    }

    impl ScriptedProvider {
        fn new(signature: Result<String, WalletError>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                signature,
            }
        }
    }

    #[async_trait]
    impl Eip1193Provider for ScriptedProvider {
        async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params.clone()));
            match method {
                "eth_accounts" => Ok(json!(["0xAbC0000000000000000000000000000000000001"])),
                "eth_chainId" => Ok(json!("0xa4b1")),
                "wallet_switchEthereumChain" => Ok(Value::Null),
                _ => self.signature.clone().map(Value::String),
            }
        }
    }

    fn sig_hex() -> String {
        let mut raw = [7u8; 65];
        raw[64] = 1;
        format!("0x{}", hex::encode(raw))
    }

    #[test]
    fn test_parse_chain_id_forms() {
        assert_eq!(parse_chain_id(&json!("0xa4b1")), Some(42161));
        assert_eq!(parse_chain_id(&json!("1")), Some(1));
        assert_eq!(parse_chain_id(&json!(421614)), Some(421614));
        assert_eq!(parse_chain_id(&json!(null)), None);
    }

    #[tokio::test]
    async fn test_chain_id_and_switch_params() {
        let wallet = JsonRpcWallet::new(ScriptedProvider::new(Ok(sig_hex())));
        assert_eq!(wallet.chain_id().await.unwrap(), 42161);
        wallet.switch_chain(1).await.unwrap();

        let calls = wallet.provider().calls.lock().unwrap();
        let (method, params) = calls.last().unwrap();
        assert_eq!(method, "wallet_switchEthereumChain");
        assert_eq!(params, &json!([{ "chainId": "0x1" }]));
    }

    #[tokio::test]
    async fn test_personal_sign_params_are_message_then_address() {
        let wallet = JsonRpcWallet::new(ScriptedProvider::new(Ok(sig_hex())));
        let sig = wallet
            .personal_sign("You are signing into Astherus 42")
            .await
            .unwrap();
        assert_eq!(sig.v(), 28);

        let calls = wallet.provider().calls.lock().unwrap();
        let (method, params) = calls.last().unwrap();
        assert_eq!(method, "personal_sign");
        assert_eq!(params[0], "You are signing into Astherus 42");
        assert_eq!(params[1], "0xAbC0000000000000000000000000000000000001");
    }

    #[tokio::test]
    async fn test_sign_typed_data_params_are_address_then_json() {
        use crate::signing::eip712::{EvmDomain, FieldValue, TypedStruct};

        let domain = EvmDomain {
            name: "Paradex".to_string(),
            version: "1".to_string(),
            chain_id: 11_155_111,
            verifying_contract: None,
        };
        let message = TypedStruct::new("Constant").field("action", FieldValue::Str("STARK Key".into()));
        let request = TypedDataRequest::new(&domain, &message).unwrap();

        let wallet = JsonRpcWallet::new(ScriptedProvider::new(Ok(sig_hex())));
        wallet.sign_typed_data(&request).await.unwrap();

        let calls = wallet.provider().calls.lock().unwrap();
        let (method, params) = calls.last().unwrap();
        assert_eq!(method, "eth_signTypedData_v4");
        assert_eq!(params[0], "0xAbC0000000000000000000000000000000000001");
        let payload: Value = serde_json::from_str(params[1].as_str().unwrap()).unwrap();
        assert_eq!(payload["primaryType"], "Constant");
        assert_eq!(payload["domain"], request.to_json()["domain"]);
        assert_eq!(payload["domain"]["name"], "Paradex");
        assert_eq!(payload["message"]["action"], "STARK Key");
    }

    #[tokio::test]
    async fn test_rejection_passes_through() {
        let wallet = JsonRpcWallet::new(ScriptedProvider::new(Err(WalletError::new(
            Some(4001),
            "User rejected the request.",
        ))));
        let err = wallet.personal_sign("hello").await.unwrap_err();
        assert!(err.is_user_rejection());
    }
}
