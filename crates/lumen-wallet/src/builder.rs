//! Payment construction, signing and submission.
//!
//! [`PaymentBuilder::build`] walks a payment through its checks in order:
//! 1. An identity must be loaded
//! 2. The amount must validate
//! 3. The destination must be a well-formed account id
//! 4. The source account is fetched fresh and its native balance checked
//! 5. The transaction is assembled with `sequence + 1`, signed and submitted
//!
//! Nothing touches the ledger before steps 1 to 3 pass.

use std::sync::Arc;

use chrono::Utc;
use lumen_core::constants::{BASE_FEE, MAX_MEMO_BYTES, TX_TIMEOUT_SECS};
use lumen_core::crypto::sign_payment;
use lumen_core::strkey;
use lumen_core::traits::LedgerClient;
use lumen_core::types::{
    Asset, PaymentOperation, PaymentRequest, PaymentTransaction, SubmissionResult,
};
use tracing::{debug, info, warn};

use crate::amount::{ValidatedAmount, validate_amount};
use crate::error::WalletError;
use crate::session::{Identity, SessionManager};

/// Truncate a memo to at most [`MAX_MEMO_BYTES`] bytes on a char boundary.
///
/// Blank memos become `None`.
pub fn truncate_memo(memo: &str) -> Option<String> {
    let memo = memo.trim();
    if memo.is_empty() {
        return None;
    }
    let mut end = memo.len().min(MAX_MEMO_BYTES);
    while !memo.is_char_boundary(end) {
        end -= 1;
    }
    Some(memo[..end].to_string())
}

/// Builds and submits native payments from the session's identity.
pub struct PaymentBuilder {
    ledger: Arc<dyn LedgerClient>,
    passphrase: String,
}

impl PaymentBuilder {
    /// Create a builder that signs for the network identified by `passphrase`.
    pub fn new(ledger: Arc<dyn LedgerClient>, passphrase: impl Into<String>) -> Self {
        Self {
            ledger,
            passphrase: passphrase.into(),
        }
    }

    /// Send `amount` native units from the current identity to `destination`.
    pub async fn build(
        &self,
        session: &SessionManager,
        destination: &str,
        amount: &str,
        memo: Option<&str>,
    ) -> Result<SubmissionResult, WalletError> {
        let identity = session.current().ok_or(WalletError::NoActiveSession)?;
        let amount = validate_amount(amount)?;
        self.send(identity, destination, &amount, memo).await
    }

    /// Send an already validated amount. Shared with the batch executor.
    pub(crate) async fn send(
        &self,
        identity: &Identity,
        destination: &str,
        amount: &ValidatedAmount,
        memo: Option<&str>,
    ) -> Result<SubmissionResult, WalletError> {
        let destination = destination.trim();
        if !strkey::is_valid_account_id(destination) {
            return Err(WalletError::InvalidAddress(destination.to_string()));
        }

        let source = identity.public_address();
        debug!(account = %source, "loading source account");
        let snapshot = self.ledger.load_account(source).await?;

        let have = snapshot.native_balance();
        if have < amount.amount() {
            return Err(WalletError::InsufficientBalance {
                have,
                need: amount.amount(),
            });
        }

        let request = PaymentRequest {
            destination: destination.to_string(),
            amount: amount.amount(),
            memo: memo.and_then(truncate_memo),
        };

        let base_fee = match self.ledger.base_fee().await {
            Ok(fee) => fee,
            Err(e) => {
                warn!("base fee lookup failed, using protocol minimum: {e}");
                BASE_FEE
            }
        };

        let now = u64::try_from(Utc::now().timestamp()).unwrap_or_default();
        let tx = PaymentTransaction {
            source: source.to_string(),
            sequence: snapshot.sequence() + 1,
            fee: base_fee,
            valid_until: now + TX_TIMEOUT_SECS,
            memo: request.memo,
            operation: PaymentOperation {
                destination: request.destination,
                asset: Asset::Native,
                amount: request.amount,
            },
        };

        let signed = sign_payment(tx, identity.keypair(), &self.passphrase)?;
        debug!(hash = %signed.hash_hex(), sequence = signed.transaction.sequence, "submitting payment");
        let result = self.ledger.submit(&signed).await?;
        info!(
            hash = %result.hash,
            destination = %signed.transaction.operation.destination,
            amount = %amount.amount(),
            "payment submitted"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::constants::TESTNET_PASSPHRASE;
    use lumen_core::error::LedgerError;
    use lumen_core::testing::MockLedger;
    use lumen_core::types::{ResultCodes, SubmissionStatus};

    const SEED_1: &str = "SAAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQCAIBAEAQC5MY";
    const ACCOUNT_1: &str = "GCFIRY65OQE7DFP5KLNS2PF2LVZMUZYJX4OZIEQ36N2IQANUB5XVYOJR";
    const ACCOUNT_2: &str = "GCATS5YOVB6ROX2WUNKGNQ2MP3GMXDMKSG2O4N5CLX3A6W4PZGZZI55U";

    fn setup(balance: &str) -> (Arc<MockLedger>, PaymentBuilder, SessionManager) {
        let ledger = Arc::new(
            MockLedger::new()
                .with_account(ACCOUNT_1, balance)
                .with_account(ACCOUNT_2, "1"),
        );
        let builder = PaymentBuilder::new(ledger.clone(), TESTNET_PASSPHRASE);
        let mut session = SessionManager::new();
        session.load_identity(SEED_1).unwrap();
        (ledger, builder, session)
    }

    #[test]
    fn memo_truncation() {
        assert_eq!(truncate_memo("hello").as_deref(), Some("hello"));
        assert_eq!(truncate_memo("   "), None);
        assert_eq!(truncate_memo(""), None);
        let long = "a".repeat(40);
        assert_eq!(truncate_memo(&long).unwrap().len(), 28);
    }

    #[test]
    fn memo_truncation_respects_char_boundaries() {
        // 9 three-byte chars = 27 bytes, the tenth would cross 28.
        let memo = "€".repeat(12);
        let out = truncate_memo(&memo).unwrap();
        assert_eq!(out.len(), 27);
        assert_eq!(out.chars().count(), 9);
    }

    #[tokio::test]
    async fn no_session_fails_without_network() {
        let ledger = Arc::new(MockLedger::new());
        let builder = PaymentBuilder::new(ledger.clone(), TESTNET_PASSPHRASE);
        let err = builder
            .build(&SessionManager::new(), ACCOUNT_2, "1", None)
            .await
            .unwrap_err();
        assert_eq!(err, WalletError::NoActiveSession);
        assert_eq!(ledger.load_calls(), 0);
        assert_eq!(ledger.submit_calls(), 0);
    }

    #[tokio::test]
    async fn invalid_amount_and_address_fail_before_network() {
        let (ledger, builder, session) = setup("100");
        let err = builder.build(&session, ACCOUNT_2, "0", None).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(_)));
        let err = builder
            .build(&session, "GNOTANADDRESS", "1", None)
            .await
            .unwrap_err();
        assert_eq!(err, WalletError::InvalidAddress("GNOTANADDRESS".into()));
        assert_eq!(ledger.load_calls(), 0);
    }

    #[tokio::test]
    async fn successful_payment_uses_next_sequence() {
        let (ledger, builder, session) = setup("100");
        let before = ledger.account(ACCOUNT_1).unwrap().sequence();

        let result = builder
            .build(&session, ACCOUNT_2, "25,5", Some("hello"))
            .await
            .unwrap();

        assert_eq!(result.status, SubmissionStatus::Success);
        let submitted = ledger.submitted();
        assert_eq!(submitted.len(), 1);
        let tx = &submitted[0].transaction;
        assert_eq!(tx.sequence, before + 1);
        assert_eq!(tx.fee, BASE_FEE);
        assert_eq!(tx.memo.as_deref(), Some("hello"));
        assert_eq!(tx.operation.amount.stroops(), 255_000_000);
        assert_eq!(result.hash, submitted[0].hash_hex());
    }

    #[tokio::test]
    async fn consecutive_payments_refetch_sequence() {
        let (ledger, builder, session) = setup("100");
        builder.build(&session, ACCOUNT_2, "1", None).await.unwrap();
        builder.build(&session, ACCOUNT_2, "1", None).await.unwrap();
        assert_eq!(ledger.submitted().len(), 2);
        assert_eq!(ledger.load_calls(), 2);
    }

    #[tokio::test]
    async fn long_memo_is_truncated() {
        let (ledger, builder, session) = setup("100");
        let memo = "x".repeat(40);
        builder
            .build(&session, ACCOUNT_2, "1", Some(&memo))
            .await
            .unwrap();
        let tx = &ledger.submitted()[0].transaction;
        assert_eq!(tx.memo.as_ref().unwrap().len(), 28);
    }

    #[tokio::test]
    async fn insufficient_balance_is_checked_against_raw_total() {
        let (ledger, builder, session) = setup("10");
        let err = builder.build(&session, ACCOUNT_2, "10.0000001", None).await.unwrap_err();
        assert!(matches!(err, WalletError::InsufficientBalance { .. }));
        assert_eq!(ledger.submit_calls(), 0);

        // Exactly the balance passes the pre-flight; the ledger rejects it for the fee.
        let err = builder.build(&session, ACCOUNT_2, "10", None).await.unwrap_err();
        assert_eq!(
            err,
            WalletError::Submission(ResultCodes {
                transaction: Some("tx_failed".into()),
                operations: vec!["op_underfunded".into()],
            })
        );
    }

    #[tokio::test]
    async fn unfunded_source_is_account_not_found() {
        let ledger = Arc::new(MockLedger::new().with_account(ACCOUNT_2, "1"));
        let builder = PaymentBuilder::new(ledger, TESTNET_PASSPHRASE);
        let mut session = SessionManager::new();
        session.load_identity(SEED_1).unwrap();
        let err = builder.build(&session, ACCOUNT_2, "1", None).await.unwrap_err();
        assert_eq!(err, WalletError::AccountNotFound(ACCOUNT_1.into()));
    }

    #[tokio::test]
    async fn transport_failure_is_transient() {
        let (ledger, builder, session) = setup("100");
        ledger.fail_loads(Some(LedgerError::Transport("connection reset".into())));
        let err = builder.build(&session, ACCOUNT_2, "1", None).await.unwrap_err();
        assert!(err.is_transient());
    }
}
