//! Exchange linking error types
//!
//! Every failure a linking flow can surface is an `ExchangeError`. The
//! `Display` output is what the account-linking UI shows verbatim, so each
//! message is short, human-readable and never carries key material.

use thiserror::Error;

/// Exchange-specific error types for linking operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The user declined or dismissed a wallet prompt
    #[error("Request rejected in wallet: {0}")]
    UserRejected(String),

    /// The exchange answered with a business-logic failure
    #[error("{venue} rejected the request: {message}")]
    ServerRejected { venue: &'static str, message: String },

    /// The request never produced a response (DNS, TLS, connect, timeout)
    #[error("Network error: {0}. Check your connection and try again")]
    Network(String),

    /// Required input missing or malformed; raised before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Wallet could not be moved to the network the venue signs on
    #[error("Could not switch wallet to chain {chain_id}: {reason}")]
    ChainSwitchFailed { chain_id: u64, reason: String },

    /// Invalid or unexpected response from exchange
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Local signing failure or an unrecognised wallet error
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// The caller cancelled the flow
    #[error("Linking cancelled")]
    Cancelled,
}

impl ExchangeError {
    /// Shorthand for a server rejection from `venue`
    pub fn rejected(venue: &'static str, message: impl Into<String>) -> Self {
        Self::ServerRejected {
            venue,
            message: message.into(),
        }
    }

    /// True when the failure came from the user declining a wallet prompt
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::UserRejected(_))
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_rejected_display_mentions_rejected() {
        let err = ExchangeError::UserRejected("User rejected the request.".to_string());
        assert!(err.to_string().to_lowercase().contains("rejected"));
        assert!(err.is_user_rejection());
    }

    #[test]
    fn test_server_rejected_display() {
        let err = ExchangeError::rejected("Aster", "duplicate description");
        assert_eq!(
            err.to_string(),
            "Aster rejected the request: duplicate description"
        );
        assert!(!err.is_user_rejection());
    }

    #[test]
    fn test_network_display_is_distinct_from_server() {
        let err = ExchangeError::Network("connection refused".to_string());
        let msg = err.to_string();
        assert!(msg.starts_with("Network error"));
        assert!(msg.contains("Check your connection"));
    }

    #[test]
    fn test_chain_switch_display() {
        let err = ExchangeError::ChainSwitchFailed {
            chain_id: 1,
            reason: "Unrecognized chain".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not switch wallet to chain 1: Unrecognized chain"
        );
    }

    #[test]
    fn test_invalid_response_display() {
        let err = ExchangeError::InvalidResponse("malformed JSON".to_string());
        assert_eq!(err.to_string(), "Invalid response: malformed JSON");
    }
}
