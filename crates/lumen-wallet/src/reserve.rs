//! Locked reserve and spendable balance.
//!
//! Every account must keep a base reserve of 0.5 XLM plus 0.5 XLM per
//! subentry (trust lines, offers, signers, data entries). Anything above that
//! is available to spend. All arithmetic is in stroops.

use lumen_core::amount::Amount;
use lumen_core::constants::{BASE_RESERVE, SUBENTRY_RESERVE};
use lumen_core::types::AccountSnapshot;

/// Native balance split into locked and spendable parts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReserveBreakdown {
    pub total: Amount,
    pub locked: Amount,
    pub available: Amount,
}

/// Reserve locked by an account with `subentry_count` subentries.
pub fn locked_reserve(subentry_count: u32) -> Amount {
    Amount::from_stroops(BASE_RESERVE + i64::from(subentry_count) * SUBENTRY_RESERVE)
}

/// Compute the reserve breakdown for a snapshot. `available` never goes negative.
pub fn reserve_breakdown(snapshot: &AccountSnapshot) -> ReserveBreakdown {
    let total = snapshot.native_balance();
    let locked = locked_reserve(snapshot.subentry_count());
    ReserveBreakdown {
        total,
        locked,
        available: total.saturating_sub(locked),
    }
}
