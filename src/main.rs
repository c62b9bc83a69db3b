//! tread-link: link an exchange account from the command line
//!
//! Usage: `tread-link <hyperliquid|aster|pacifica|paradex> [evm|solana]`
//!
//! Keys come from the environment (or `.env`):
//! - `EVM_PRIVATE_KEY` for Hyperliquid, Paradex and Aster on EVM
//! - `SOLANA_SECRET_KEY` (base58) for Pacifica and Aster on Solana
//! - `EVM_CHAIN_ID` chain the local EVM wallet starts on (default 42161)
//! - `HYPERLIQUID_VAULT_ADDRESS` optional vault to name the agent after

use std::path::Path;

use anyhow::{bail, Context};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use tread_link::adapters::{
    AsterAdapter, ExchangeCredential, HyperliquidAdapter, PacificaAdapter, ParadexAdapter, Venue,
};
use tread_link::config::{self, constants, LinkConfig};
use tread_link::core::logging::{init_logging, sanitize};
use tread_link::wallet::{ChainType, LocalEvmWallet, SolanaKeypair, WalletHandle};

const DEFAULT_EVM_CHAIN_ID: u64 = 42161;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let mut args = std::env::args().skip(1);
    let venue: Venue = match args.next() {
        Some(v) => v.parse().map_err(anyhow::Error::msg)?,
        None => bail!("usage: tread-link <hyperliquid|aster|pacifica|paradex> [evm|solana]"),
    };
    let aster_chain = match args.next().as_deref() {
        None | Some("evm") => ChainType::Evm,
        Some("solana") => ChainType::Solana,
        Some(other) => bail!("unknown chain '{}' (expected evm or solana)", other),
    };

    constants::log_configuration();
    let config = load_link_config()?;

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                info!("[SHUTDOWN] Cancelling linking flow");
                shutdown.cancel();
            }
            Err(err) => {
                eprintln!("Failed to listen for Ctrl+C signal: {}", err);
            }
        }
    });

    info!(venue = %venue, production = config.production, "Linking account");
    let result = run(venue, aster_chain, &config, &cancel).await;

    match result {
        Ok(credential) => {
            info!(venue = %venue, "Account linked");
            println!("api_key:    {}", credential.api_key);
            println!("api_secret: {}", sanitize(&credential.api_secret));
            Ok(())
        }
        Err(e) => {
            error!(venue = %venue, error = %e, "Linking failed");
            Err(e)
        }
    }
}

/// `LINK_CONFIG` if it exists, defaults otherwise
fn load_link_config() -> anyhow::Result<LinkConfig> {
    let path = constants::config_path();
    if Path::new(&path).exists() {
        info!(path = %path, "Loading configuration");
        Ok(config::load_config(Path::new(&path))?)
    } else {
        info!(path = %path, "No configuration file, using defaults");
        Ok(LinkConfig::default())
    }
}

async fn run(
    venue: Venue,
    aster_chain: ChainType,
    config: &LinkConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<ExchangeCredential> {
    let client = config.rest_client();
    let credential = match venue {
        Venue::Hyperliquid => {
            let hl = config.hyperliquid();
            let builder = hl
                .builder_address
                .clone()
                .context("hyperliquid.builder_address must be set in the configuration")?;
            let vault = std::env::var("HYPERLIQUID_VAULT_ADDRESS").ok();
            let wallet = evm_wallet()?;
            HyperliquidAdapter::with_client(hl, client)
                .add_account(&wallet, &builder, vault.as_deref(), cancel)
                .await?
        }
        Venue::Aster => {
            let adapter = AsterAdapter::with_client(config.aster(), client);
            match aster_chain {
                ChainType::Evm => {
                    let wallet = evm_wallet()?;
                    adapter.add_account(WalletHandle::Evm(&wallet), cancel).await?
                }
                ChainType::Solana => {
                    let wallet = solana_wallet()?;
                    adapter
                        .add_account(WalletHandle::Solana(&wallet), cancel)
                        .await?
                }
            }
        }
        Venue::Pacifica => {
            let wallet = solana_wallet()?;
            PacificaAdapter::with_client(config.pacifica(), client)
                .add_account(&wallet, cancel)
                .await?
        }
        Venue::Paradex => {
            let wallet = evm_wallet()?;
            ParadexAdapter::with_client(config.paradex(), client)
                .add_account(&wallet, cancel)
                .await?
        }
    };
    Ok(credential)
}

fn evm_wallet() -> anyhow::Result<LocalEvmWallet> {
    let key = std::env::var("EVM_PRIVATE_KEY").context("EVM_PRIVATE_KEY is not set")?;
    let chain_id = match std::env::var("EVM_CHAIN_ID") {
        Ok(v) => v
            .parse()
            .with_context(|| format!("EVM_CHAIN_ID '{}' is not a number", v))?,
        Err(_) => DEFAULT_EVM_CHAIN_ID,
    };
    Ok(LocalEvmWallet::from_private_key(&key, chain_id)?)
}

fn solana_wallet() -> anyhow::Result<SolanaKeypair> {
    let secret = std::env::var("SOLANA_SECRET_KEY").context("SOLANA_SECRET_KEY is not set")?;
    Ok(SolanaKeypair::from_base58(&secret)?)
}
