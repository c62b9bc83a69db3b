//! Hyperliquid response types and rejection classification

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::errors::ExchangeError;
use crate::core::http::RestResponse;

pub const VENUE: &str = "Hyperliquid";

/// Body of every `/exchange` answer: `{"status": "ok"|"err", "response": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeResponse {
    pub status: String,
    #[serde(default)]
    pub response: Value,
}

impl ExchangeResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Server text carried by an `err` answer
    pub fn error_text(&self) -> String {
        match &self.response {
            Value::String(s) => s.clone(),
            Value::Null => "unknown error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Known reasons Hyperliquid refuses a user-signed action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MustDeposit,
    InvalidSignature,
    NonceReused,
    InvalidBuilder,
    InvalidAgent,
    Other,
}

/// Checked in order; the generic "signature" comes last so a refusal that
/// names its subject ("invalid builder signature") keeps that subject.
const REJECTION_PATTERNS: &[(&str, Rejection)] = &[
    ("must deposit", Rejection::MustDeposit),
    ("nonce", Rejection::NonceReused),
    ("builder", Rejection::InvalidBuilder),
    ("agent", Rejection::InvalidAgent),
    ("signature", Rejection::InvalidSignature),
];

impl Rejection {
    pub fn classify(message: &str) -> Self {
        let lower = message.to_lowercase();
        REJECTION_PATTERNS
            .iter()
            .find(|(pattern, _)| lower.contains(pattern))
            .map(|(_, rejection)| *rejection)
            .unwrap_or(Rejection::Other)
    }

    fn user_message(&self) -> Option<&'static str> {
        match self {
            Rejection::MustDeposit => {
                Some("deposit funds into this Hyperliquid account before linking it")
            }
            Rejection::InvalidSignature => Some(
                "the signature was not accepted; check the wallet is on the expected network and try again",
            ),
            Rejection::NonceReused => Some("the request nonce was already used; try again"),
            Rejection::InvalidBuilder => Some("the builder fee approval was refused"),
            Rejection::InvalidAgent => Some("the agent wallet approval was refused"),
            Rejection::Other => None,
        }
    }
}

/// Classified `ServerRejected` for a refusal text
pub fn rejection_error(message: &str) -> ExchangeError {
    let message = message.trim();
    match Rejection::classify(message).user_message() {
        Some(tailored) => ExchangeError::rejected(VENUE, format!("{} ({})", tailored, message)),
        None => ExchangeError::rejected(VENUE, message),
    }
}

/// Turn an HTTP answer into the `response` payload, or a classified error
pub fn parse_exchange_response(response: &RestResponse) -> Result<Value, ExchangeError> {
    if !response.is_success() {
        return Err(rejection_error(&response.error_message()));
    }
    let parsed: ExchangeResponse = response.json()?;
    if parsed.is_ok() {
        Ok(parsed.response)
    } else {
        Err(rejection_error(&parsed.error_text()))
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
    fn test_classify_known_rejections() {
        assert_eq!(
            Rejection::classify("Must deposit before performing actions. User: 0xabc"),
            Rejection::MustDeposit
        );
        assert_eq!(
            Rejection::classify("L1 error: User or API Wallet 0x12 does not exist. Invalid signature"),
            Rejection::InvalidSignature
        );
        assert_eq!(
            Rejection::classify("Invalid nonce: duplicate nonce 1700000000000"),
            Rejection::NonceReused
        );
        assert_eq!(Rejection::classify("Invalid builder fee"), Rejection::InvalidBuilder);
        assert_eq!(Rejection::classify("Extra agent already used."), Rejection::InvalidAgent);
        assert_eq!(Rejection::classify("Something else"), Rejection::Other);
    }

    #[test]
    fn test_specific_subject_wins_over_signature() {
        assert_eq!(
            Rejection::classify("Invalid builder signature"),
            Rejection::InvalidBuilder
        );
        assert_eq!(
            Rejection::classify("Agent signature does not match"),
            Rejection::InvalidAgent
        );
        assert_eq!(
            Rejection::classify("Signature uses a stale nonce"),
            Rejection::NonceReused
        );
    }

    #[test]
    fn test_ok_response_returns_payload() {
        let r = response(200, r#"{"status":"ok","response":{"type":"default"}}"#);
        let payload = parse_exchange_response(&r).unwrap();
        assert_eq!(payload["type"], "default");
    }

    #[test]
    fn test_err_response_is_classified() {
        let r = response(200, r#"{"status":"err","response":"Must deposit before performing actions."}"#);
        let err = parse_exchange_response(&r).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Hyperliquid rejected the request"));
        assert!(msg.contains("deposit funds"));
    }

    #[test]
    fn test_unclassified_error_keeps_server_text() {
        let err = rejection_error("Vault not registered");
        assert_eq!(
            err.to_string(),
            "Hyperliquid rejected the request: Vault not registered"
        );
    }

    #[test]
    fn test_http_error_is_rejection() {
        let r = response(422, "Failed to deserialize the JSON body");
        let err = parse_exchange_response(&r).unwrap_err();
        assert!(matches!(err, ExchangeError::ServerRejected { .. }));
    }

    #[test]
    fn test_non_json_ok_status_is_invalid_response() {
        let r = response(200, "<html>");
        assert!(matches!(
            parse_exchange_response(&r),
            Err(ExchangeError::InvalidResponse(_))
        ));
    }
}
