//! Paradex account linking
//!
//! This module is organized into submodules:
//! - `config` - Endpoints and linking options
//! - `types` - `/system/config` and response types
//! - `signing` - STARK key derivation and Starknet messages
//! - `adapter` - The onboarding flow itself

pub mod adapter;
pub mod config;
pub mod signing;
pub mod types;

pub use adapter::{add_paradex_account, DerivedAccount, ParadexAdapter};
pub use config::ParadexConfig;
pub use signing::{derive_account_address, private_key_from_eth_signature};
pub use types::ParadexSystemConfig;
