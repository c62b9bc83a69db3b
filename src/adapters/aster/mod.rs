//! Aster account linking (EVM and Solana wallets)

pub mod adapter;
pub mod config;
pub mod types;

pub use adapter::{add_aster_account, AsterAdapter};
pub use config::AsterConfig;
