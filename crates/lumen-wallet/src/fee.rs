//! Advisory fee estimation.

use lumen_core::constants::STROOPS_PER_UNIT;

/// Total fee in XLM for `tx_count` transactions of `ops_per_tx` operations at
/// `base_fee` stroops per operation.
///
/// Display only; real transactions use the base fee reported by the ledger.
pub fn estimate_fee(tx_count: u64, ops_per_tx: u64, base_fee: u32) -> f64 {
    let total_stroops = tx_count as f64 * ops_per_tx as f64 * f64::from(base_fee);
    total_stroops / STROOPS_PER_UNIT as f64
}
