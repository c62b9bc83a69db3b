//! Aster request and response types

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::core::http::RestResponse;

pub const VENUE: &str = "Aster";

/// What a server nonce will be spent on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceAction {
    Login,
    CreateApiKey,
}

impl NonceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NonceAction::Login => "LOGIN",
            NonceAction::CreateApiKey => "CREATE_API_KEY",
        }
    }
}

/// Common envelope: `{"code", "message", "data", "success"}`
#[derive(Debug, Clone, Deserialize)]
pub struct AsterResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// Parse the envelope and require `success: true`
pub fn expect_success(response: &RestResponse) -> ExchangeResult<AsterResponse> {
    if !response.is_success() {
        return Err(ExchangeError::rejected(VENUE, response.error_message()));
    }
    let parsed: AsterResponse = response.json()?;
    if !parsed.success {
        let message = parsed
            .message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| response.error_message());
        return Err(ExchangeError::rejected(VENUE, message));
    }
    Ok(parsed)
}

/// `data.nonce`, sent as a string or a number
pub fn extract_nonce(envelope: &AsterResponse) -> ExchangeResult<String> {
    match envelope.data.get("nonce") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(ExchangeError::InvalidResponse(
            "Aster nonce response has no data.nonce".to_string(),
        )),
    }
}

/// `data.apiKey` / `data.apiSecret`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyData {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
}

pub fn extract_api_key(envelope: &AsterResponse) -> ExchangeResult<(String, String)> {
    let data: ApiKeyData = serde_json::from_value(envelope.data.clone())
        .map_err(|e| ExchangeError::InvalidResponse(format!("Aster API key response: {}", e)))?;
    match (data.api_key, data.api_secret) {
        (Some(key), Some(secret)) if !key.is_empty() && !secret.is_empty() => Ok((key, secret)),
        _ => Err(ExchangeError::InvalidResponse(
            "Aster did not return an API key and secret".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn response(status: u16, body: &str) -> RestResponse {
        RestResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_nonce_string_or_number() {
        let r = response(200, r#"{"success":true,"data":{"nonce":"42"}}"#);
        assert_eq!(extract_nonce(&expect_success(&r).unwrap()).unwrap(), "42");

        let r = response(200, r#"{"success":true,"data":{"nonce":918273}}"#);
        assert_eq!(extract_nonce(&expect_success(&r).unwrap()).unwrap(), "918273");

        let r = response(200, r#"{"success":true,"data":{}}"#);
        assert!(extract_nonce(&expect_success(&r).unwrap()).is_err());
    }

    #[test]
    fn test_success_false_surfaces_server_message() {
        let r = response(200, r#"{"code":"1","message":"signature invalid","success":false}"#);
        let err = expect_success(&r).unwrap_err();
        assert_eq!(err.to_string(), "Aster rejected the request: signature invalid");
    }

    #[test]
    fn test_missing_success_flag_is_failure() {
        let r = response(200, r#"{"data":{}}"#);
        assert!(matches!(
            expect_success(&r),
            Err(ExchangeError::ServerRejected { .. })
        ));
    }

    #[test]
    fn test_api_key_extraction_requires_both_halves() {
        let r = response(200, r#"{"success":true,"data":{"apiKey":"k","apiSecret":"s"}}"#);
        let (key, secret) = extract_api_key(&expect_success(&r).unwrap()).unwrap();
        assert_eq!((key.as_str(), secret.as_str()), ("k", "s"));

        let r = response(200, r#"{"success":true,"data":{"apiKey":"k"}}"#);
        assert!(matches!(
            extract_api_key(&expect_success(&r).unwrap()),
            Err(ExchangeError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_action_names() {
        assert_eq!(NonceAction::Login.as_str(), "LOGIN");
        assert_eq!(NonceAction::CreateApiKey.as_str(), "CREATE_API_KEY");
    }
}
