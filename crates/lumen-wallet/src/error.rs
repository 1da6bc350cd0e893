//! Wallet error types.
//!
//! Every failure that reaches the controller, the batch executor or the
//! monitor is one of these kinds. Lower-level ledger, faucet and crypto
//! errors are folded in through the `From` impls below.

use lumen_core::amount::Amount;
use lumen_core::error::{CryptoError, FaucetError, LedgerError};
use lumen_core::types::ResultCodes;
use thiserror::Error;

/// Errors that can occur in wallet operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Amount does not match the decimal grammar or is not positive.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Secret seed is malformed.
    #[error("invalid secret key")]
    InvalidSecret,

    /// Destination is not a well-formed account id.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Operation needs a loaded identity.
    #[error("no active session: load or create an account first")]
    NoActiveSession,

    /// Pre-flight check: native balance is below the requested amount.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// Native balance of the source account.
        have: Amount,
        /// Amount requested.
        need: Amount,
    },

    /// The account does not exist on the ledger (never funded?).
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The network rejected the transaction.
    #[error("submission rejected: {0}")]
    Submission(ResultCodes),

    /// Timeout, connectivity, server-side failure or unreadable response.
    #[error("network error: {0}")]
    TransientNetwork(String),

    /// The request was refused as sent (4xx status) or could not be built.
    #[error("request refused: {0}")]
    Request(String),

    /// The faucet could not fund a newly generated account.
    #[error("funding failed: {0}")]
    Funding(String),
}

impl WalletError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletError::TransientNetwork(_))
    }
}

impl From<LedgerError> for WalletError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => WalletError::AccountNotFound(id),
            LedgerError::Rejected(codes) => WalletError::Submission(codes),
            LedgerError::Transport(msg) => WalletError::TransientNetwork(msg),
            LedgerError::Http { status, .. } if status < 500 => {
                WalletError::Request(err.to_string())
            }
            LedgerError::Encoding(_) => WalletError::Request(err.to_string()),
            LedgerError::Http { .. } | LedgerError::MalformedResponse(_) => {
                WalletError::TransientNetwork(err.to_string())
            }
        }
    }
}

impl From<FaucetError> for WalletError {
    fn from(err: FaucetError) -> Self {
        WalletError::Funding(err.to_string())
    }
}

impl From<CryptoError> for WalletError {
    /// Account-id failures are address errors; everything else on the
    /// signing path originates from the secret.
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidAccountId(_) | CryptoError::InvalidPublicKey => {
                WalletError::InvalidAddress(err.to_string())
            }
            CryptoError::InvalidSecret(_)
            | CryptoError::VerificationFailed
            | CryptoError::Serialization(_) => WalletError::InvalidSecret,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::error::StrKeyError;

    #[test]
    fn display_insufficient_balance() {
        let e = WalletError::InsufficientBalance {
            have: Amount::from_stroops(10_000_000),
            need: Amount::from_stroops(25_000_000),
        };
        assert_eq!(
            e.to_string(),
            "insufficient balance: have 1.0000000, need 2.5000000"
        );
    }

    #[test]
    fn display_no_active_session() {
        assert_eq!(
            WalletError::NoActiveSession.to_string(),
            "no active session: load or create an account first"
        );
    }

    #[test]
    fn ledger_not_found_maps_to_account_not_found() {
        let e: WalletError = LedgerError::NotFound("GABC".into()).into();
        assert_eq!(e, WalletError::AccountNotFound("GABC".into()));
    }

    #[test]
    fn ledger_rejection_keeps_result_codes() {
        let codes = ResultCodes {
            transaction: Some("tx_failed".into()),
            operations: vec!["op_no_destination".into()],
        };
        let e: WalletError = LedgerError::Rejected(codes.clone()).into();
        assert_eq!(e, WalletError::Submission(codes));
        assert!(!e.is_transient());
    }

    #[test]
    fn ledger_http_is_transient() {
        let e: WalletError = LedgerError::Http {
            status: 504,
            body: "gateway timeout".into(),
        }
        .into();
        assert!(e.is_transient());
        assert_eq!(e.to_string(), "network error: HTTP 504: gateway timeout");
    }

    #[test]
    fn ledger_client_error_is_not_transient() {
        let e: WalletError = LedgerError::Http {
            status: 400,
            body: "bad account id".into(),
        }
        .into();
        assert!(!e.is_transient());
        assert_eq!(e.to_string(), "request refused: HTTP 400: bad account id");
    }

    #[test]
    fn encoding_failure_is_not_transient() {
        let e: WalletError = LedgerError::Encoding("buffer full".into()).into();
        assert_eq!(
            e,
            WalletError::Request("could not encode transaction: buffer full".into())
        );
        assert!(!e.is_transient());
    }

    #[test]
    fn faucet_error_maps_to_funding() {
        let e: WalletError = FaucetError::Http(400).into();
        assert_eq!(e, WalletError::Funding("faucet returned HTTP 400".into()));
    }

    #[test]
    fn crypto_secret_error_maps_to_invalid_secret() {
        let e: WalletError = CryptoError::InvalidSecret(StrKeyError::InvalidChecksum).into();
        assert_eq!(e, WalletError::InvalidSecret);
    }
}
