//! # lumen-wallet — Interactive session wallet.
//!
//! Holds one in-memory identity per process, validates and submits native
//! payments, runs sequential airdrops that continue past individual
//! failures, and polls balances in a cancellable background task. The
//! [`controller`] ties everything together behind a numbered text menu.
//!
//! # Modules
//!
//! - [`error`] — `WalletError` enum
//! - [`amount`] — User amount normalisation and validation
//! - [`reserve`] — Locked reserve and spendable balance
//! - [`fee`] — Advisory fee estimation
//! - [`session`] — `SessionManager` and `Identity`
//! - [`builder`] — `PaymentBuilder`: validate, sign, submit
//! - [`batch`] — `BatchExecutor` for airdrops
//! - [`monitor`] — `BalanceMonitor` polling task
//! - [`controller`] — Menu state machine
//! - [`render`] — Console formatting helpers

pub mod amount;
pub mod batch;
pub mod builder;
pub mod controller;
pub mod error;
pub mod fee;
pub mod monitor;
pub mod render;
pub mod reserve;
pub mod session;

// Re-exports for convenient access
pub use amount::{validate_amount, ValidatedAmount};
pub use batch::{BatchExecutor, BatchOutcome, BatchReport};
pub use builder::PaymentBuilder;
pub use controller::{Controller, ControllerConfig};
pub use error::WalletError;
pub use fee::estimate_fee;
pub use monitor::{BalanceMonitor, MonitorEvent, MonitorHandle};
pub use reserve::{ReserveBreakdown, locked_reserve, reserve_breakdown};
pub use session::{GeneratedIdentity, Identity, SessionManager};
