//! Exact fixed-point amounts denominated in stroops.
//!
//! The ledger represents every balance as a signed 64-bit count of stroops
//! with seven implied decimal places. [`Amount`] mirrors that representation
//! so that reserve and balance arithmetic never goes through floating point.
//!
//! The textual grammar is `\d+(\.\d{1,7})?`. Parsing is strict: no sign, no
//! exponent, no surrounding whitespace. Normalisation of user input (comma
//! separators, trimming) happens in the wallet crate before parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{AMOUNT_DECIMALS, STROOPS_PER_UNIT};
use crate::error::AmountError;

/// A non-negative quantity of the native asset (or an issued asset) in stroops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, bincode::Encode)]
pub struct Amount(i64);

impl Amount {
    /// Zero stroops.
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from a raw stroop count. Negative input clamps to zero.
    pub fn from_stroops(stroops: i64) -> Self {
        Self(stroops.max(0))
    }

    /// Raw stroop count.
    pub fn stroops(&self) -> i64 {
        self.0
    }

    /// Whether this amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Subtract, flooring at zero.
    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0).max(0))
    }

    /// Add, returning `None` on overflow.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Whole-unit value as a float (display helper, never used for arithmetic).
    pub fn as_units_f64(&self) -> f64 {
        self.0 as f64 / STROOPS_PER_UNIT as f64
    }

    /// Parse a decimal string in the strict amount grammar.
    pub fn parse(s: &str) -> Result<Self, AmountError> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::Malformed(s.to_string()));
        }

        let mut stroops: i64 = 0;
        for b in whole.bytes() {
            stroops = stroops
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(b - b'0')))
                .ok_or(AmountError::Overflow)?;
        }
        stroops = stroops
            .checked_mul(STROOPS_PER_UNIT)
            .ok_or(AmountError::Overflow)?;

        if let Some(frac) = frac {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountError::Malformed(s.to_string()));
            }
            if frac.len() > AMOUNT_DECIMALS {
                return Err(AmountError::TooManyDecimals(frac.len()));
            }
            let mut frac_stroops: i64 = 0;
            for b in frac.bytes() {
                frac_stroops = frac_stroops * 10 + i64::from(b - b'0');
            }
            frac_stroops *= 10_i64.pow((AMOUNT_DECIMALS - frac.len()) as u32);
            stroops = stroops
                .checked_add(frac_stroops)
                .ok_or(AmountError::Overflow)?;
        }

        Ok(Self(stroops))
    }
}

impl fmt::Display for Amount {
    /// Always renders seven fractional digits, e.g. `25.0000000`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / STROOPS_PER_UNIT;
        let frac = self.0 % STROOPS_PER_UNIT;
        write!(f, "{whole}.{frac:07}")
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(serde::de::Error::custom)
    }
}
