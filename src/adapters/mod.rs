//! Account-linking flows for Hyperliquid, Aster, Pacifica and Paradex
//!
//! Each venue module turns a connected wallet into trading credentials
//! (`ExchangeCredential`) through its own sequence of signed requests.

pub mod aster;
pub mod errors;
pub mod hyperliquid;
pub mod pacifica;
pub mod paradex;
pub mod types;

// Re-export commonly used types for convenience
pub use aster::{add_aster_account, AsterAdapter, AsterConfig};
pub use errors::{ExchangeError, ExchangeResult};
pub use hyperliquid::{add_hyperliquid_account, HyperliquidAdapter, HyperliquidConfig};
pub use pacifica::{add_pacifica_account, PacificaAdapter, PacificaConfig};
pub use paradex::{add_paradex_account, ParadexAdapter, ParadexConfig};
pub use types::{ExchangeCredential, Venue};
