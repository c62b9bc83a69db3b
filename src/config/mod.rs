//! Link configuration and YAML loading
//!
//! This module provides:
//! - Configuration types (`LinkConfig`, `HttpConfig`)
//! - YAML loading functionality (`load_config`)
//! - Process constants with environment variable overrides

pub mod constants;
mod loader;
mod types;

pub use types::{HttpConfig, LinkConfig};

pub use loader::{load_config, load_config_from_str};
