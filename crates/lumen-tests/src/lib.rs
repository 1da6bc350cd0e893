//! End-to-end test suite for the Lumen wallet.
//!
//! Drives the wallet components and the interactive controller against the
//! in-memory ledger and faucet from `lumen_core::testing`.

pub mod helpers;
