//! Types shared by every venue

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::core::logging::sanitize;

/// Venues with an account-linking flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Venue {
    Hyperliquid,
    Aster,
    Pacifica,
    Paradex,
}

impl Venue {
    pub const ALL: [Venue; 4] = [
        Venue::Hyperliquid,
        Venue::Aster,
        Venue::Pacifica,
        Venue::Paradex,
    ];

    /// Display name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Venue::Hyperliquid => "Hyperliquid",
            Venue::Aster => "Aster",
            Venue::Pacifica => "Pacifica",
            Venue::Paradex => "Paradex",
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name().to_lowercase())
    }
}

impl FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hyperliquid" => Ok(Venue::Hyperliquid),
            "aster" => Ok(Venue::Aster),
            "pacifica" => Ok(Venue::Pacifica),
            "paradex" => Ok(Venue::Paradex),
            other => Err(format!(
                "unknown venue '{}' (expected hyperliquid, aster, pacifica or paradex)",
                other
            )),
        }
    }
}

/// Trading credential produced by a linking flow.
///
/// `api_key` is public (wallet address, agent public key, Paradex account);
/// `api_secret` is the private half and never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeCredential {
    pub api_key: String,
    pub api_secret: String,
}

impl ExchangeCredential {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
    }
}

impl fmt::Debug for ExchangeCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeCredential")
            .field("api_key", &self.api_key)
            .field("api_secret", &sanitize(&self.api_secret).to_string())
            .finish()
    }
}
