//! Configuration types for account linking
//!
//! One YAML document configures every venue. `production` is set once at
//! the top level and handed down to each venue section by its accessor.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::aster::AsterConfig;
use crate::adapters::hyperliquid::HyperliquidConfig;
use crate::adapters::pacifica::PacificaConfig;
use crate::adapters::paradex::ParadexConfig;
use crate::core::http::RestClient;
use crate::error::AppError;

// ============================================================================
// Configuration Structs
// ============================================================================

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
    /// TCP/TLS connect timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 10,
        }
    }
}

/// Root linking configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LinkConfig {
    /// Mainnet endpoints when true, testnet otherwise
    pub production: bool,
    pub http: HttpConfig,
    hyperliquid: HyperliquidConfig,
    aster: AsterConfig,
    pacifica: PacificaConfig,
    paradex: ParadexConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            production: true,
            http: HttpConfig::default(),
            hyperliquid: HyperliquidConfig::default(),
            aster: AsterConfig::default(),
            pacifica: PacificaConfig::default(),
            paradex: ParadexConfig::default(),
        }
    }
}

impl LinkConfig {
    pub fn hyperliquid(&self) -> HyperliquidConfig {
        HyperliquidConfig {
            production: self.production,
            ..self.hyperliquid.clone()
        }
    }

    pub fn aster(&self) -> AsterConfig {
        AsterConfig {
            production: self.production,
            ..self.aster.clone()
        }
    }

    pub fn pacifica(&self) -> PacificaConfig {
        PacificaConfig {
            production: self.production,
            ..self.pacifica.clone()
        }
    }

    pub fn paradex(&self) -> ParadexConfig {
        ParadexConfig {
            production: self.production,
            ..self.paradex.clone()
        }
    }

    /// HTTP client built from the `http` section
    pub fn rest_client(&self) -> RestClient {
        RestClient::new(
            Duration::from_secs(self.http.timeout_secs),
            Duration::from_secs(self.http.connect_timeout_secs),
        )
    }

    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            return Err(AppError::Config(format!(
                "http timeouts must be > 0 (got timeout_secs={}, connect_timeout_secs={})",
                self.http.timeout_secs, self.http.connect_timeout_secs
            )));
        }

        self.hyperliquid()
            .validate()
            .and_then(|_| self.aster().validate())
            .and_then(|_| self.pacifica().validate())
            .and_then(|_| self.paradex().validate())
            .map_err(|e| AppError::Config(e.to_string()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid_mainnet() {
        let config = LinkConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.hyperliquid().production);
        assert!(config.paradex().production);
    }

    #[test]
    fn test_production_flag_reaches_every_venue() {
        let config: LinkConfig = serde_yaml::from_str("production: false").unwrap();
        assert!(!config.hyperliquid().production);
        assert!(!config.aster().production);
        assert!(!config.pacifica().production);
        assert!(!config.paradex().production);
        assert_eq!(config.pacifica().referral_code(), "pump");
    }

    #[test]
    fn test_venue_sections_override_defaults() {
        let yaml = r#"
hyperliquid:
  builder_address: "0x1924b8561eef20e70ede628a296175d358be80e5"
  agent_name_prefix: "tf-"
paradex:
  subkey_name: desk
  referral_code: friend
"#;
        let config: LinkConfig = serde_yaml::from_str(yaml).unwrap();
        let hl = config.hyperliquid();
        assert_eq!(hl.agent_name_prefix, "tf-");
        assert_eq!(hl.max_fee_rate, "0.1%");
        assert_eq!(config.paradex().subkey_name, "desk");
        assert_eq!(config.paradex().referral_code.as_deref(), Some("friend"));
        assert_eq!(config.aster().agent_code, "248Dbf");
    }

    #[test]
    fn test_zero_timeout_fails() {
        let mut config = LinkConfig::default();
        config.http.timeout_secs = 0;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("http timeouts must be > 0"));
    }

    #[test]
    fn test_venue_validation_becomes_config_error() {
        let yaml = "paradex:\n  subkey_name: \"\"\n";
        let config: LinkConfig = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
        assert!(err.to_string().contains("subkey_name"));
    }
}
