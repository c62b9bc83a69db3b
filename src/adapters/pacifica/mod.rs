//! Pacifica account linking (Solana wallets)

pub mod adapter;
pub mod config;
pub mod signing;
pub mod types;

pub use adapter::{add_pacifica_account, PacificaAdapter};
pub use config::PacificaConfig;
