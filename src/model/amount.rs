//! Lenient parsing for monetary values.
//!
//! Amounts arrive from the server and from user input as text that may carry a currency symbol
//! or thousands separators (`"$1,200.00"`, `"₹350"`, `"3.50"`). `Amount` wraps `Decimal` and
//! accepts all of those forms; its display is always the plain decimal form.

use rust_decimal::Decimal;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A monetary amount backed by `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying `Decimal` value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

/// The parse failure type. Carries the offending input so log lines are useful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAmountError(String);

impl Display for ParseAmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a valid amount", self.0)
    }
}

impl std::error::Error for ParseAmountError {}

impl FromStr for Amount {
    type Err = ParseAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Strip currency symbols and thousands separators, keeping digits, sign and the
        // decimal point. A leading minus may appear before or after the currency symbol.
        let cleaned: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '$' | '₹' | '€' | '£' | ','))
            .collect();
        if cleaned.is_empty() {
            return Err(ParseAmountError(s.to_string()));
        }
        Decimal::from_str(&cleaned)
            .map(Amount)
            .map_err(|_| ParseAmountError(s.to_string()))
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
