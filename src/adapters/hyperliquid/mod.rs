//! Hyperliquid account linking
//!
//! - `config` - base URLs, fee rate and agent naming
//! - `signing` - user-signed EIP-712 actions
//! - `types` - `/exchange` responses and rejection classification
//! - `adapter` - the linking flow and transfer actions

pub mod adapter;
pub mod config;
pub mod signing;
pub mod types;

pub use adapter::{
    add_hyperliquid_account, send_asset, spot_send_from_hyperliquid, withdraw_from_hyperliquid,
    HyperliquidAdapter,
};
pub use config::HyperliquidConfig;
pub use signing::{SendAssetParams, UserAction};
