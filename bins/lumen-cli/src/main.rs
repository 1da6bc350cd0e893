//! lumen: interactive menu wallet for the Stellar test network.
//!
//! Reads commands from stdin, talks to Horizon for account data and
//! submissions, and to Friendbot for funding new accounts. Logs go to
//! stderr so they never interleave with the menu.

mod config;
mod friendbot;
mod horizon;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::traits::{Faucet, LedgerClient};
use lumen_wallet::{Controller, ControllerConfig};
use tokio::io::BufReader;
use tracing::info;

use crate::config::Config;
use crate::friendbot::FriendbotClient;
use crate::horizon::HorizonClient;

/// Interactive Stellar testnet wallet.
#[derive(Parser, Debug)]
#[command(name = "lumen", version, about)]
pub struct Cli {
    /// Horizon endpoint [env: LUMEN_HORIZON_URL]
    #[arg(long)]
    pub horizon_url: Option<String>,

    /// Friendbot endpoint [env: LUMEN_FRIENDBOT_URL]
    #[arg(long)]
    pub friendbot_url: Option<String>,

    /// Network passphrase transactions are signed for [env: LUMEN_NETWORK_PASSPHRASE]
    #[arg(long)]
    pub network_passphrase: Option<String>,

    /// HTTP request timeout in seconds [env: LUMEN_HTTP_TIMEOUT_SECS]
    #[arg(long)]
    pub http_timeout_secs: Option<u64>,

    /// Default balance monitor interval in milliseconds [env: LUMEN_MONITOR_INTERVAL_MS]
    #[arg(long)]
    pub monitor_interval_ms: Option<u64>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    pub log_format: String,
}

/// Initialize tracing on stderr. `RUST_LOG` wins over `level_str`.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, &cli.log_format);

    let config = Config::from_env()?.with_overrides(&cli)?;
    info!(
        horizon = %config.horizon_url,
        friendbot = %config.friendbot_url,
        "starting lumen"
    );

    let ledger: Arc<dyn LedgerClient> =
        Arc::new(HorizonClient::new(&config.horizon_url, config.http_timeout)?);
    let faucet: Arc<dyn Faucet> =
        Arc::new(FriendbotClient::new(&config.friendbot_url, config.http_timeout)?);

    let mut controller = Controller::new(
        ledger,
        faucet,
        ControllerConfig {
            passphrase: config.network_passphrase,
            monitor_interval: config.monitor_interval,
        },
        BufReader::new(tokio::io::stdin()),
        std::io::stdout(),
    );
    controller.run().await.context("console I/O failed")?;
    Ok(())
}
