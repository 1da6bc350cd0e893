//! In-memory ledger and faucet doubles for tests.
//!
//! [`MockLedger`] enforces the rules the wallet depends on: signatures must
//! verify, the sequence number must be exactly `current + 1`, and the source
//! must hold enough native balance for amount plus fee. Accepted payments
//! move funds, bump the source sequence and append history records.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::amount::Amount;
use crate::constants::{BASE_FEE, STROOPS_PER_UNIT, TESTNET_PASSPHRASE};
use crate::crypto::verify_payment;
use crate::error::{FaucetError, LedgerError};
use crate::traits::{Faucet, FundingReceipt, LedgerClient};
use crate::types::{
    AccountSnapshot, Asset, Balance, Order, PaymentRecord, ResultCodes, SignedPayment,
    SubmissionResult, SubmissionStatus,
};

/// Starting balance handed out by [`MockFaucet`] (10 000 XLM, like Friendbot).
pub const FAUCET_STARTING_BALANCE: i64 = 10_000 * STROOPS_PER_UNIT;

fn rejected(tx: &str, ops: &[&str]) -> LedgerError {
    LedgerError::Rejected(ResultCodes {
        transaction: Some(tx.to_string()),
        operations: ops.iter().map(|s| s.to_string()).collect(),
    })
}

fn with_native_delta(snap: &AccountSnapshot, delta: i64, sequence: i64) -> AccountSnapshot {
    let mut balances = snap.balances().to_vec();
    match balances.iter_mut().find(|b| b.is_native()) {
        Some(Balance::Native { amount }) => {
            *amount = Amount::from_stroops(amount.stroops() + delta);
        }
        _ => balances.push(Balance::Native {
            amount: Amount::from_stroops(delta),
        }),
    }
    AccountSnapshot::new(snap.id(), sequence, snap.subentry_count(), balances)
        .expect("at most one native entry")
}

/// Scriptable in-memory [`LedgerClient`].
pub struct MockLedger {
    passphrase: String,
    base_fee: u32,
    accounts: Mutex<HashMap<String, AccountSnapshot>>,
    history: Mutex<HashMap<String, Vec<PaymentRecord>>>,
    rejections: Mutex<HashMap<String, ResultCodes>>,
    load_failure: Mutex<Option<LedgerError>>,
    submitted: Mutex<Vec<SignedPayment>>,
    ledger_seq: AtomicUsize,
    load_calls: AtomicUsize,
    submit_calls: AtomicUsize,
}

impl MockLedger {
    /// Empty ledger on the test network.
    pub fn new() -> Self {
        Self {
            passphrase: TESTNET_PASSPHRASE.to_string(),
            base_fee: BASE_FEE,
            accounts: Mutex::new(HashMap::new()),
            history: Mutex::new(HashMap::new()),
            rejections: Mutex::new(HashMap::new()),
            load_failure: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            ledger_seq: AtomicUsize::new(1_000),
            load_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        }
    }

    /// Create (or replace) an account holding `native` whole units.
    pub fn with_account(self, account_id: &str, native: &str) -> Self {
        self.create_account(account_id, Amount::parse(native).expect("valid amount"));
        self
    }

    pub fn create_account(&self, account_id: &str, native: Amount) {
        let snap = AccountSnapshot::new(
            account_id,
            (self.accounts.lock().len() as i64 + 1) << 32,
            0,
            vec![Balance::Native { amount: native }],
        )
        .expect("single native entry");
        self.accounts.lock().insert(account_id.to_string(), snap);
    }

    /// Replace an account snapshot wholesale.
    pub fn set_account(&self, snapshot: AccountSnapshot) {
        self.accounts
            .lock()
            .insert(snapshot.id().to_string(), snapshot);
    }

    pub fn account(&self, account_id: &str) -> Option<AccountSnapshot> {
        self.accounts.lock().get(account_id).cloned()
    }

    /// Reject every payment addressed to `destination` with the given codes.
    pub fn reject_payments_to(&self, destination: &str, codes: ResultCodes) {
        self.rejections
            .lock()
            .insert(destination.to_string(), codes);
    }

    /// Make every `load_account` call fail with `err` (or succeed again with `None`).
    pub fn fail_loads(&self, err: Option<LedgerError>) {
        *self.load_failure.lock() = err;
    }

    pub fn add_history(&self, account_id: &str, record: PaymentRecord) {
        self.history
            .lock()
            .entry(account_id.to_string())
            .or_default()
            .push(record);
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Payments the ledger accepted, in order.
    pub fn submitted(&self) -> Vec<SignedPayment> {
        self.submitted.lock().clone()
    }
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn load_account(&self, account_id: &str) -> Result<AccountSnapshot, LedgerError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.load_failure.lock().clone() {
            return Err(err);
        }
        self.account(account_id)
            .ok_or_else(|| LedgerError::NotFound(account_id.to_string()))
    }

    async fn submit(&self, payment: &SignedPayment) -> Result<SubmissionResult, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        if verify_payment(payment, &self.passphrase).is_err() {
            return Err(rejected("tx_bad_auth", &[]));
        }

        let tx = &payment.transaction;
        let op = &tx.operation;
        if let Some(codes) = self.rejections.lock().get(&op.destination) {
            return Err(LedgerError::Rejected(codes.clone()));
        }

        let mut accounts = self.accounts.lock();
        let source = accounts
            .get(&tx.source)
            .cloned()
            .ok_or_else(|| rejected("tx_no_source_account", &[]))?;
        if tx.sequence != source.sequence() + 1 {
            return Err(rejected("tx_bad_seq", &[]));
        }
        let destination = accounts
            .get(&op.destination)
            .cloned()
            .ok_or_else(|| rejected("tx_failed", &["op_no_destination"]))?;

        let debit = op.amount.stroops() + i64::from(tx.fee);
        if source.native_balance().stroops() < debit {
            return Err(rejected("tx_failed", &["op_underfunded"]));
        }

        accounts.insert(
            tx.source.clone(),
            with_native_delta(&source, -debit, tx.sequence),
        );
        let dest_after = accounts
            .get(&op.destination)
            .cloned()
            .unwrap_or(destination);
        accounts.insert(
            op.destination.clone(),
            with_native_delta(&dest_after, op.amount.stroops(), dest_after.sequence()),
        );
        drop(accounts);

        let record = PaymentRecord {
            id: format!("{}", self.submitted.lock().len() + 1),
            kind: "payment".into(),
            from: tx.source.clone(),
            to: op.destination.clone(),
            amount: op.amount,
            asset: Asset::Native,
            created_at: Utc::now(),
            transaction_hash: payment.hash_hex(),
        };
        self.add_history(&tx.source, record.clone());
        if op.destination != tx.source {
            self.add_history(&op.destination, record);
        }
        self.submitted.lock().push(payment.clone());

        let ledger = self.ledger_seq.fetch_add(1, Ordering::SeqCst) as u32;
        Ok(SubmissionResult {
            hash: payment.hash_hex(),
            status: SubmissionStatus::Success,
            ledger: Some(ledger),
        })
    }

    async fn payments_for(
        &self,
        account_id: &str,
        limit: u32,
        order: Order,
    ) -> Result<Vec<PaymentRecord>, LedgerError> {
        let mut records = self
            .history
            .lock()
            .get(account_id)
            .cloned()
            .unwrap_or_default();
        if order == Order::Desc {
            records.reverse();
        }
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn base_fee(&self) -> Result<u32, LedgerError> {
        Ok(self.base_fee)
    }
}

/// Scriptable [`Faucet`]. When attached to a [`MockLedger`], funding creates
/// the account there with [`FAUCET_STARTING_BALANCE`].
pub struct MockFaucet {
    ledger: Option<Arc<MockLedger>>,
    failure: Option<FaucetError>,
    funded: Mutex<Vec<String>>,
}

impl MockFaucet {
    /// Faucet that funds accounts on `ledger`.
    pub fn funding(ledger: Arc<MockLedger>) -> Self {
        Self {
            ledger: Some(ledger),
            failure: None,
            funded: Mutex::new(Vec::new()),
        }
    }

    /// Faucet that always fails with `err`.
    pub fn failing(err: FaucetError) -> Self {
        Self {
            ledger: None,
            failure: Some(err),
            funded: Mutex::new(Vec::new()),
        }
    }

    /// Accounts this faucet was asked to fund (successfully or not).
    pub fn funded(&self) -> Vec<String> {
        self.funded.lock().clone()
    }
}

#[async_trait]
impl Faucet for MockFaucet {
    async fn fund(&self, account_id: &str) -> Result<FundingReceipt, FaucetError> {
        self.funded.lock().push(account_id.to_string());
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if let Some(ledger) = &self.ledger {
            ledger.create_account(account_id, Amount::from_stroops(FAUCET_STARTING_BALANCE));
        }
        Ok(FundingReceipt {
            hash: Some(format!("funding-{}", &account_id[..8.min(account_id.len())])),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{sign_payment, KeyPair};
    use crate::types::{PaymentOperation, PaymentTransaction};

    fn payment(kp: &KeyPair, dest: &str, seq: i64, stroops: i64) -> SignedPayment {
        let tx = PaymentTransaction {
            source: kp.account_id(),
            sequence: seq,
            fee: BASE_FEE,
            valid_until: 0,
            memo: None,
            operation: PaymentOperation {
                destination: dest.to_string(),
                asset: Asset::Native,
                amount: Amount::from_stroops(stroops),
            },
        };
        sign_payment(tx, kp, TESTNET_PASSPHRASE).unwrap()
    }

    #[tokio::test]
    async fn accepted_payment_moves_funds_and_bumps_sequence() {
        let src = KeyPair::generate();
        let dst = KeyPair::generate().account_id();
        let ledger = MockLedger::new()
            .with_account(&src.account_id(), "100")
            .with_account(&dst, "1");
        let seq = ledger.account(&src.account_id()).unwrap().sequence();

        ledger
            .submit(&payment(&src, &dst, seq + 1, 10 * STROOPS_PER_UNIT))
            .await
            .unwrap();

        let after = ledger.account(&src.account_id()).unwrap();
        assert_eq!(after.sequence(), seq + 1);
        assert_eq!(
            after.native_balance().stroops(),
            90 * STROOPS_PER_UNIT - i64::from(BASE_FEE)
        );
        assert_eq!(
            ledger.account(&dst).unwrap().native_balance().stroops(),
            11 * STROOPS_PER_UNIT
        );
    }

    #[tokio::test]
    async fn stale_sequence_is_rejected() {
        let src = KeyPair::generate();
        let dst = KeyPair::generate().account_id();
        let ledger = MockLedger::new()
            .with_account(&src.account_id(), "100")
            .with_account(&dst, "1");
        let seq = ledger.account(&src.account_id()).unwrap().sequence();

        let err = ledger
            .submit(&payment(&src, &dst, seq, 1))
            .await
            .unwrap_err();
        assert_eq!(err, rejected("tx_bad_seq", &[]));
    }

    #[tokio::test]
    async fn faucet_creates_account() {
        let ledger = Arc::new(MockLedger::new());
        let faucet = MockFaucet::funding(ledger.clone());
        let id = KeyPair::generate().account_id();
        faucet.fund(&id).await.unwrap();
        assert_eq!(
            ledger.load_account(&id).await.unwrap().native_balance().stroops(),
            FAUCET_STARTING_BALANCE
        );
    }
}
