//! Pacifica response types

use serde::Deserialize;
use serde_json::Value;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::core::http::RestResponse;

pub const VENUE: &str = "Pacifica";

/// `{"success": bool, "data": ..., "error": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct PacificaResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub error: Option<String>,
}

/// Require HTTP success and `success: true`
pub fn expect_success(response: &RestResponse) -> ExchangeResult<PacificaResponse> {
    if !response.is_success() {
        return Err(ExchangeError::rejected(VENUE, response.error_message()));
    }
    let parsed: PacificaResponse = response.json()?;
    if !parsed.success {
        let message = parsed
            .error
            .clone()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| response.error_message());
        return Err(ExchangeError::rejected(VENUE, message));
    }
    Ok(parsed)
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
    fn test_success() {
        assert!(expect_success(&response(200, r#"{"success":true,"data":null}"#)).is_ok());
    }

    #[test]
    fn test_failure_uses_error_field() {
        let err = expect_success(&response(200, r#"{"success":false,"error":"Builder code not found"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "Pacifica rejected the request: Builder code not found");
    }

    #[test]
    fn test_http_error() {
        let err = expect_success(&response(400, r#"{"error":"Invalid signature"}"#)).unwrap_err();
        assert!(err.to_string().contains("Invalid signature"));
    }
}
