//! Friendbot faucet client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use lumen_core::error::FaucetError;
use lumen_core::traits::{Faucet, FundingReceipt};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub struct FriendbotClient {
    client: Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct FundResponse {
    #[serde(default)]
    hash: Option<String>,
}

impl FriendbotClient {
    pub fn new(endpoint: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }
}

#[async_trait]
impl Faucet for FriendbotClient {
    async fn fund(&self, account_id: &str) -> Result<FundingReceipt, FaucetError> {
        debug!(endpoint = %self.endpoint, account = %account_id, "requesting funds");
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("addr", account_id)])
            .send()
            .await
            .map_err(|e| FaucetError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FaucetError::Http(resp.status().as_u16()));
        }
        let body: FundResponse = resp
            .json()
            .await
            .map_err(|e| FaucetError::MalformedResponse(e.to_string()))?;
        Ok(FundingReceipt { hash: body.hash })
    }
}
