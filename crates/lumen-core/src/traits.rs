//! Collaborator interfaces consumed by the wallet core.
//!
//! - [`LedgerClient`]: account lookup, submission and payment history
//!   (the CLI implements it over Horizon HTTP)
//! - [`Faucet`]: testnet account funding (the CLI implements it over Friendbot)
//!
//! The wallet only ever talks to these traits, so tests substitute the
//! in-memory doubles from [`testing`](crate::testing).

use async_trait::async_trait;

use crate::constants::BASE_FEE;
use crate::error::{FaucetError, LedgerError};
use crate::types::{AccountSnapshot, Order, PaymentRecord, SignedPayment, SubmissionResult};

/// Read and write access to the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch the current state of an account. Unknown accounts yield
    /// [`LedgerError::NotFound`].
    async fn load_account(&self, account_id: &str) -> Result<AccountSnapshot, LedgerError>;

    /// Submit a signed payment. Network-side rejections yield
    /// [`LedgerError::Rejected`] carrying the protocol result codes.
    async fn submit(&self, payment: &SignedPayment) -> Result<SubmissionResult, LedgerError>;

    /// Most recent payment-type operations touching `account_id`.
    async fn payments_for(
        &self,
        account_id: &str,
        limit: u32,
        order: Order,
    ) -> Result<Vec<PaymentRecord>, LedgerError>;

    /// Current per-operation base fee in stroops.
    ///
    /// Default implementation returns the protocol minimum.
    async fn base_fee(&self) -> Result<u32, LedgerError> {
        Ok(BASE_FEE)
    }
}

/// Receipt returned by a successful faucet call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FundingReceipt {
    /// Hash of the funding transaction, when the faucet reports one.
    pub hash: Option<String>,
}

/// Testnet funding service.
#[async_trait]
pub trait Faucet: Send + Sync {
    async fn fund(&self, account_id: &str) -> Result<FundingReceipt, FaucetError>;
}
