//! Normalisation and validation of user-entered amounts.
//!
//! Accepts `25`, `25.5`, `25,5` and `  25.1234567 `; rejects anything that
//! is not a strictly positive decimal with at most seven fractional digits.

use lumen_core::amount::Amount;
use lumen_core::error::AmountError;

use crate::error::WalletError;

/// An amount that passed validation, with its normalised text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedAmount {
    text: String,
    amount: Amount,
}

impl ValidatedAmount {
    /// Normalised text as the user typed it (`25,5` becomes `25.5`).
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

/// Replace the first comma with a period and trim surrounding whitespace.
pub fn normalize_amount(raw: &str) -> String {
    raw.replacen(',', ".", 1).trim().to_string()
}

/// Normalise `raw` and accept it iff it matches `\d+(\.\d{1,7})?` and is > 0.
pub fn validate_amount(raw: &str) -> Result<ValidatedAmount, WalletError> {
    let text = normalize_amount(raw);
    let amount = Amount::parse(&text).map_err(|e| match e {
        AmountError::Empty => WalletError::InvalidAmount("empty".into()),
        other => WalletError::InvalidAmount(format!("{text:?}: {other}")),
    })?;
    if !amount.is_positive() {
        return Err(WalletError::InvalidAmount(format!(
            "{text:?}: must be greater than zero"
        )));
    }
    Ok(ValidatedAmount { text, amount })
}
