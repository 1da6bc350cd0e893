//! CLI configuration: environment variables first, command-line flags on top.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use lumen_core::constants::{DEFAULT_MONITOR_INTERVAL_MS, TESTNET_PASSPHRASE};

use crate::Cli;

const DEFAULT_HORIZON_URL: &str = "https://horizon-testnet.stellar.org";
const DEFAULT_FRIENDBOT_URL: &str = "https://friendbot.stellar.org";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    /// Horizon REST endpoint.
    pub horizon_url: String,
    /// Friendbot endpoint used to fund new accounts.
    pub friendbot_url: String,
    /// Network passphrase payments are signed for.
    pub network_passphrase: String,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Default balance monitor interval.
    pub monitor_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let horizon_url =
            std::env::var("LUMEN_HORIZON_URL").unwrap_or_else(|_| DEFAULT_HORIZON_URL.into());

        let friendbot_url =
            std::env::var("LUMEN_FRIENDBOT_URL").unwrap_or_else(|_| DEFAULT_FRIENDBOT_URL.into());

        let network_passphrase = std::env::var("LUMEN_NETWORK_PASSPHRASE")
            .unwrap_or_else(|_| TESTNET_PASSPHRASE.into());

        let http_timeout_secs: u64 = std::env::var("LUMEN_HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_HTTP_TIMEOUT_SECS.to_string())
            .parse()
            .context("LUMEN_HTTP_TIMEOUT_SECS must be a positive integer")?;

        let monitor_interval_ms: u64 = std::env::var("LUMEN_MONITOR_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_MONITOR_INTERVAL_MS.to_string())
            .parse()
            .context("LUMEN_MONITOR_INTERVAL_MS must be a positive integer")?;

        Self {
            horizon_url,
            friendbot_url,
            network_passphrase,
            http_timeout: Duration::from_secs(http_timeout_secs),
            monitor_interval: Duration::from_millis(monitor_interval_ms),
        }
        .validated()
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, cli: &Cli) -> Result<Self> {
        if let Some(url) = &cli.horizon_url {
            self.horizon_url = url.clone();
        }
        if let Some(url) = &cli.friendbot_url {
            self.friendbot_url = url.clone();
        }
        if let Some(passphrase) = &cli.network_passphrase {
            self.network_passphrase = passphrase.clone();
        }
        if let Some(secs) = cli.http_timeout_secs {
            self.http_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = cli.monitor_interval_ms {
            self.monitor_interval = Duration::from_millis(ms);
        }
        self.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.http_timeout.is_zero() {
            bail!("HTTP timeout must be greater than zero");
        }
        if self.monitor_interval.is_zero() {
            bail!("monitor interval must be greater than zero");
        }
        for (name, url) in [
            ("Horizon", &self.horizon_url),
            ("Friendbot", &self.friendbot_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("{name} URL must start with http:// or https://, got {url:?}");
            }
        }
        Ok(self)
    }
}
