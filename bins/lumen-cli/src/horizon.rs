//! Horizon REST client.
//!
//! Implements [`LedgerClient`] over the Horizon HTTP API:
//!
//! | Operation      | Request                                   |
//! |----------------|-------------------------------------------|
//! | `load_account` | `GET  /accounts/{id}`                     |
//! | `submit`       | `POST /transactions` (form field `tx`)    |
//! | `payments_for` | `GET  /accounts/{id}/payments?limit&order`|
//! | `base_fee`     | `GET  /fee_stats`                         |
//!
//! The `tx` field carries the hex-encoded canonical transaction bytes
//! followed by the 64-byte signature.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lumen_core::amount::Amount;
use lumen_core::error::LedgerError;
use lumen_core::traits::LedgerClient;
use lumen_core::types::{
    AccountSnapshot, Asset, Balance, Order, PaymentRecord, ResultCodes, SignedPayment,
    SubmissionResult, SubmissionStatus,
};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

pub struct HorizonClient {
    client: Client,
    base_url: String,
}

impl HorizonClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, LedgerError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "GET");
        self.client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(transport)
    }
}

fn transport(e: reqwest::Error) -> LedgerError {
    LedgerError::Transport(e.to_string())
}

async fn http_error(resp: Response) -> LedgerError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    LedgerError::Http { status, body }
}

// ── Wire types ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct AccountResponse {
    account_id: String,
    sequence: String,
    #[serde(default)]
    subentry_count: u32,
    balances: Vec<BalanceLine>,
}

#[derive(Debug, Deserialize)]
struct BalanceLine {
    asset_type: String,
    #[serde(default)]
    asset_code: Option<String>,
    #[serde(default)]
    asset_issuer: Option<String>,
    balance: String,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    hash: String,
    #[serde(default)]
    ledger: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct Problem {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    extras: Option<ProblemExtras>,
}

#[derive(Debug, Deserialize)]
struct ProblemExtras {
    #[serde(default)]
    result_codes: Option<ResultCodes>,
}

impl Problem {
    /// Result codes when present, otherwise the problem type slug (or title)
    /// as the transaction code.
    fn into_result_codes(self, status: u16) -> ResultCodes {
        if let Some(codes) = self.extras.and_then(|e| e.result_codes) {
            return codes;
        }
        let slug = self
            .kind
            .as_deref()
            .and_then(|t| t.rsplit('/').next())
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        ResultCodes {
            transaction: slug
                .or(self.title)
                .or_else(|| Some(format!("http_{status}"))),
            operations: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(rename = "_embedded")]
    embedded: Embedded<T>,
}

#[derive(Debug, Deserialize)]
struct Embedded<T> {
    records: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct OperationRecord {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    created_at: DateTime<Utc>,
    transaction_hash: String,
    #[serde(default)]
    source_account: Option<String>,
    // payment / path payments
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    amount: Option<String>,
    #[serde(default)]
    asset_type: Option<String>,
    #[serde(default)]
    asset_code: Option<String>,
    #[serde(default)]
    asset_issuer: Option<String>,
    // create_account
    #[serde(default)]
    funder: Option<String>,
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    starting_balance: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeeStats {
    last_ledger_base_fee: String,
}

// ── Conversions ───────────────────────────────────────────────────────────────

fn parse_amount(raw: &str) -> Result<Amount, LedgerError> {
    Amount::parse(raw).map_err(|e| LedgerError::MalformedResponse(format!("amount {raw:?}: {e}")))
}

fn into_snapshot(resp: AccountResponse) -> Result<AccountSnapshot, LedgerError> {
    let sequence: i64 = resp
        .sequence
        .parse()
        .map_err(|_| LedgerError::MalformedResponse(format!("sequence {:?}", resp.sequence)))?;

    let mut balances = Vec::with_capacity(resp.balances.len());
    for line in resp.balances {
        let amount = parse_amount(&line.balance)?;
        match (line.asset_type.as_str(), line.asset_code, line.asset_issuer) {
            ("native", _, _) => balances.push(Balance::Native { amount }),
            (_, Some(asset_code), Some(asset_issuer)) => balances.push(Balance::Issued {
                asset_code,
                asset_issuer,
                amount,
            }),
            // Liquidity pool shares have no code/issuer.
            _ => {}
        }
    }
    AccountSnapshot::new(resp.account_id, sequence, resp.subentry_count, balances)
}

fn into_record(op: OperationRecord) -> Result<PaymentRecord, LedgerError> {
    let asset = match (op.asset_type.as_deref(), op.asset_code, op.asset_issuer) {
        (Some(t), Some(code), Some(issuer)) if t != "native" => Asset::Issued { code, issuer },
        _ => Asset::Native,
    };
    let amount = match op.amount.as_deref().or(op.starting_balance.as_deref()) {
        Some(raw) => parse_amount(raw)?,
        None => Amount::ZERO,
    };
    Ok(PaymentRecord {
        id: op.id,
        kind: op.kind,
        from: op.from.or(op.funder).or(op.source_account).unwrap_or_default(),
        to: op.to.or(op.account).unwrap_or_default(),
        amount,
        asset,
        created_at: op.created_at,
        transaction_hash: op.transaction_hash,
    })
}

/// Hex of the canonical transaction bytes followed by the signature.
fn envelope(payment: &SignedPayment) -> Result<String, LedgerError> {
    let mut bytes = bincode::encode_to_vec(&payment.transaction, bincode::config::standard())
        .map_err(|e| LedgerError::Encoding(e.to_string()))?;
    bytes.extend_from_slice(&payment.signature);
    Ok(hex::encode(bytes))
}

/// Classify a failed submission. Any 4xx is a refusal of this transaction;
/// Horizon usually attaches result codes to the problem document. 5xx stays a
/// plain HTTP error.
fn submission_error(status: u16, body: &str) -> LedgerError {
    if StatusCode::from_u16(status).is_ok_and(|s| s.is_client_error()) {
        let problem = serde_json::from_str::<Problem>(body).unwrap_or_default();
        return LedgerError::Rejected(problem.into_result_codes(status));
    }
    LedgerError::Http {
        status,
        body: body.to_string(),
    }
}

#[async_trait]
impl LedgerClient for HorizonClient {
    async fn load_account(&self, account_id: &str) -> Result<AccountSnapshot, LedgerError> {
        let resp = self.get(&format!("/accounts/{account_id}"), &[]).await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(LedgerError::NotFound(account_id.to_string())),
            s if s.is_success() => {
                let body: AccountResponse = resp
                    .json()
                    .await
                    .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;
                into_snapshot(body)
            }
            _ => Err(http_error(resp).await),
        }
    }

    async fn submit(&self, payment: &SignedPayment) -> Result<SubmissionResult, LedgerError> {
        let url = format!("{}/transactions", self.base_url);
        debug!(%url, hash = %payment.hash_hex(), "POST");
        let resp = self
            .client
            .post(&url)
            .form(&[("tx", envelope(payment)?)])
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(transport)?;
        if !status.is_success() {
            return Err(submission_error(status.as_u16(), &body));
        }
        let accepted: SubmitResponse = serde_json::from_str(&body)
            .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;
        Ok(SubmissionResult {
            hash: accepted.hash,
            status: if accepted.ledger.is_some() {
                SubmissionStatus::Success
            } else {
                SubmissionStatus::Pending
            },
            ledger: accepted.ledger,
        })
    }

    async fn payments_for(
        &self,
        account_id: &str,
        limit: u32,
        order: Order,
    ) -> Result<Vec<PaymentRecord>, LedgerError> {
        let query = [
            ("limit", limit.to_string()),
            ("order", order.as_str().to_string()),
        ];
        let resp = self
            .get(&format!("/accounts/{account_id}/payments"), &query)
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Err(LedgerError::NotFound(account_id.to_string())),
            s if s.is_success() => {
                let page: Page<OperationRecord> = resp
                    .json()
                    .await
                    .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;
                page.embedded.records.into_iter().map(into_record).collect()
            }
            _ => Err(http_error(resp).await),
        }
    }

    async fn base_fee(&self) -> Result<u32, LedgerError> {
        let resp = self.get("/fee_stats", &[]).await?;
        if !resp.status().is_success() {
            return Err(http_error(resp).await);
        }
        let stats: FeeStats = resp
            .json()
            .await
            .map_err(|e| LedgerError::MalformedResponse(e.to_string()))?;
        stats.last_ledger_base_fee.parse().map_err(|_| {
            LedgerError::MalformedResponse(format!("base fee {:?}", stats.last_ledger_base_fee))
        })
    }
}
