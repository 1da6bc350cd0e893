//! Sequential airdrops.
//!
//! Sends the same amount to every destination in turn, one submission at a
//! time so the source sequence number never races. A failure is recorded
//! against its destination and the run moves on.

use lumen_core::amount::Amount;
use lumen_core::types::SubmissionResult;
use tracing::{info, warn};

use crate::amount::validate_amount;
use crate::builder::PaymentBuilder;
use crate::error::WalletError;
use crate::session::SessionManager;

/// Number of destination characters quoted in the airdrop memo.
const MEMO_PREFIX_CHARS: usize = 6;

/// Memo attached to each airdrop payment.
pub fn airdrop_memo(destination: &str) -> String {
    let prefix: String = destination.chars().take(MEMO_PREFIX_CHARS).collect();
    format!("Airdrop to {prefix}…")
}

/// Split a comma-separated destination list, dropping blank entries.
pub fn parse_destinations(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Result for a single destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub destination: String,
    pub result: Result<SubmissionResult, WalletError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-destination outcomes, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub amount: Amount,
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Runs airdrops through a [`PaymentBuilder`].
pub struct BatchExecutor<'a> {
    builder: &'a PaymentBuilder,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(builder: &'a PaymentBuilder) -> Self {
        Self { builder }
    }

    /// Pay `amount` to each destination in order.
    ///
    /// Fails up front only for a missing session or an invalid amount. Every
    /// per-destination error ends up in the report instead.
    pub async fn run(
        &self,
        session: &SessionManager,
        destinations: &[String],
        amount: &str,
    ) -> Result<BatchReport, WalletError> {
        let identity = session.current().ok_or(WalletError::NoActiveSession)?;
        let amount = validate_amount(amount)?;

        let mut outcomes = Vec::with_capacity(destinations.len());
        for (i, destination) in destinations.iter().enumerate() {
            let memo = airdrop_memo(destination);
            let result = self
                .builder
                .send(identity, destination, &amount, Some(&memo))
                .await;
            if let Err(e) = &result {
                warn!(index = i, destination = %destination, "airdrop payment failed: {e}");
            }
            outcomes.push(BatchOutcome {
                destination: destination.clone(),
                result,
            });
        }

        let report = BatchReport {
            amount: amount.amount(),
            outcomes,
        };
        info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            "airdrop finished"
        );
        Ok(report)
    }
}
