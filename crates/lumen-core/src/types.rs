//! Ledger data types shared by the wallet and the network clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;
use crate::error::LedgerError;

/// An asset: the native lumen or a credit issued by an account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, bincode::Encode)]
pub enum Asset {
    Native,
    Issued { code: String, issuer: String },
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Asset::Native => write!(f, "XLM"),
            Asset::Issued { code, issuer } => {
                write!(f, "{code}:{}…", issuer.get(..6).unwrap_or(issuer))
            }
        }
    }
}

/// One balance line of an account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Balance {
    Native {
        amount: Amount,
    },
    Issued {
        asset_code: String,
        asset_issuer: String,
        amount: Amount,
    },
}

impl Balance {
    pub fn amount(&self) -> Amount {
        match self {
            Balance::Native { amount } | Balance::Issued { amount, .. } => *amount,
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Balance::Native { .. })
    }
}

/// Point-in-time view of an account as reported by the ledger.
///
/// Snapshots are never mutated after construction. Callers fetch a fresh one
/// before every submission so the sequence number is current.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    id: String,
    sequence: i64,
    subentry_count: u32,
    balances: Vec<Balance>,
}

impl AccountSnapshot {
    /// Build a snapshot, rejecting balance lists with more than one native entry.
    pub fn new(
        id: impl Into<String>,
        sequence: i64,
        subentry_count: u32,
        balances: Vec<Balance>,
    ) -> Result<Self, LedgerError> {
        let natives = balances.iter().filter(|b| b.is_native()).count();
        if natives > 1 {
            return Err(LedgerError::MalformedResponse(format!(
                "{natives} native balance entries"
            )));
        }
        Ok(Self {
            id: id.into(),
            sequence,
            subentry_count,
            balances,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current sequence number; the next transaction must use `sequence + 1`.
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    pub fn subentry_count(&self) -> u32 {
        self.subentry_count
    }

    pub fn balances(&self) -> &[Balance] {
        &self.balances
    }

    /// Native balance, or zero when the account carries no native line.
    pub fn native_balance(&self) -> Amount {
        self.balances
            .iter()
            .find(|b| b.is_native())
            .map(Balance::amount)
            .unwrap_or(Amount::ZERO)
    }
}

/// What the user asked to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentRequest {
    pub destination: String,
    pub amount: Amount,
    /// Text memo, already truncated to [`MAX_MEMO_BYTES`](crate::constants::MAX_MEMO_BYTES).
    pub memo: Option<String>,
}

/// The single payment operation carried by a transaction.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode)]
pub struct PaymentOperation {
    pub destination: String,
    pub asset: Asset,
    pub amount: Amount,
}

/// An unsigned single-operation payment transaction.
///
/// This is the canonical form that gets hashed and signed. Encoding it into
/// the ledger's own wire format is the network client's job.
#[derive(Clone, Debug, PartialEq, Eq, bincode::Encode)]
pub struct PaymentTransaction {
    pub source: String,
    pub sequence: i64,
    /// Total fee in stroops (base fee × operation count).
    pub fee: u32,
    /// Unix timestamp after which the network must refuse the transaction.
    pub valid_until: u64,
    pub memo: Option<String>,
    pub operation: PaymentOperation,
}

/// A transaction together with its hash and the source account's signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedPayment {
    pub transaction: PaymentTransaction,
    pub hash: [u8; 32],
    pub signature: [u8; 64],
    /// Account id (`G…`) of the signer.
    pub signer: String,
}

impl SignedPayment {
    /// Lowercase hex transaction hash.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Outcome status of an accepted submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    /// Included in a closed ledger.
    Success,
    /// Accepted but not yet confirmed.
    Pending,
}

/// Result of an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub hash: String,
    pub status: SubmissionStatus,
    pub ledger: Option<u32>,
}

/// Protocol result codes attached to a rejected transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultCodes {
    pub transaction: Option<String>,
    #[serde(default)]
    pub operations: Vec<String>,
}

impl fmt::Display for ResultCodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.transaction {
            Some(tx) => write!(f, "{tx}")?,
            None => write!(f, "unknown")?,
        }
        if !self.operations.is_empty() {
            write!(f, " [{}]", self.operations.join(", "))?;
        }
        Ok(())
    }
}

/// Sort order for history queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// One entry of an account's payment history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,
    /// Operation type as reported by the ledger (`payment`, `create_account`, ...).
    pub kind: String,
    pub from: String,
    pub to: String,
    pub amount: Amount,
    pub asset: Asset,
    pub created_at: DateTime<Utc>,
    pub transaction_hash: String,
}

impl PaymentRecord {
    pub fn is_payment(&self) -> bool {
        self.kind == "payment"
    }

    /// Whether `account` is the receiving side of this record.
    pub fn is_incoming_for(&self, account: &str) -> bool {
        self.to == account
    }
}
