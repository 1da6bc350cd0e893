//! # lumen-core — Foundation types for the Lumen wallet.
//!
//! This crate defines the shared vocabulary used by the wallet crate and the
//! command-line binary: fixed-point amounts, account snapshots, payment
//! transactions, StrKey account/seed encoding, Ed25519 signing, and the
//! collaborator traits that the network and faucet clients implement.
//!
//! # Modules
//!
//! - [`constants`] — Protocol constants (reserves, fees, stroops per unit)
//! - [`amount`] — `Amount`, an exact stroop-denominated quantity
//! - [`types`] — Account snapshots, balances, payments and submission results
//! - [`error`] — Error enums for each concern
//! - [`strkey`] — `G…`/`S…` key encoding with CRC16 checksums
//! - [`crypto`] — Keypairs and payment signing
//! - [`traits`] — `LedgerClient` and `Faucet` collaborator interfaces

pub mod amount;
pub mod constants;
pub mod crypto;
pub mod error;
pub mod strkey;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
