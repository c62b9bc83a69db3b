//! Tread account linking
//!
//! Turns a connected wallet into trading credentials on:
//! - Hyperliquid (EIP-712 builder fee + agent approval)
//! - Aster (EVM or Solana sign-in, then broker API key)
//! - Pacifica (Solana builder approval + agent binding)
//! - Paradex (STARK key derivation, onboarding, subkey registration)

pub mod adapters;
pub mod config;
pub mod core;
pub mod error;
pub mod signing;
pub mod wallet;

pub use adapters::{ExchangeCredential, ExchangeError, ExchangeResult, Venue};
pub use error::AppError;
