//! Error types for the Lumen core.
use thiserror::Error;

use crate::types::ResultCodes;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")] Empty,
    #[error("malformed amount: {0:?}")] Malformed(String),
    #[error("too many decimal places: {0} > 7")] TooManyDecimals(usize),
    #[error("amount out of range")] Overflow,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrKeyError {
    #[error("invalid length: {0}")] InvalidLength(usize),
    #[error("invalid character: {0}")] InvalidCharacter(char),
    #[error("invalid version byte: {0:#04x}")] InvalidVersion(u8),
    #[error("invalid checksum")] InvalidChecksum,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid secret seed: {0}")] InvalidSecret(StrKeyError),
    #[error("invalid account id: {0}")] InvalidAccountId(StrKeyError),
    #[error("invalid public key bytes")] InvalidPublicKey,
    #[error("signature verification failed")] VerificationFailed,
    #[error("serialization: {0}")] Serialization(String),
}

/// Failures reported by a [`LedgerClient`](crate::traits::LedgerClient).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The account does not exist on the ledger (HTTP 404).
    #[error("account not found: {0}")]
    NotFound(String),
    /// The network refused the transaction.
    #[error("transaction rejected: {0}")]
    Rejected(ResultCodes),
    /// Connection, timeout or TLS failure.
    #[error("transport: {0}")]
    Transport(String),
    /// Unexpected HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The response body could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The outgoing transaction could not be serialized.
    #[error("could not encode transaction: {0}")]
    Encoding(String),
}

/// Failures reported by a [`Faucet`](crate::traits::Faucet).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaucetError {
    #[error("faucet returned HTTP {0}")] Http(u16),
    #[error("faucet transport: {0}")] Transport(String),
    #[error("faucet response: {0}")] MalformedResponse(String),
}
