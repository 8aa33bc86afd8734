//! Integer money amounts.

use serde::{Deserialize, Serialize};

/// Money amount in the smallest currency unit.
///
/// Catalog prices are whole units (`5000` is displayed as `$5000`), and all
/// arithmetic stays in integers so totals never drift.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount a spreadsheet number cell holds without rounding (2^53 - 1).
    pub const MAX_EXACT: Money = Money((1 << 53) - 1);

    /// Creates a money amount from raw units.
    pub fn from_units(units: i64) -> Self {
        Self(units)
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self(0)
    }

    /// Returns the raw amount.
    pub fn units(&self) -> i64 {
        self.0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    /// Adds another amount, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Sums amounts, returning `None` if any partial sum overflows.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Converts to `f64`, returning `None` when the amount is beyond
    /// [`Money::MAX_EXACT`] and would be rounded.
    pub fn to_f64_exact(&self) -> Option<f64> {
        (self.0.unsigned_abs() <= Self::MAX_EXACT.0 as u64).then_some(self.0 as f64)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0 {
            write!(f, "-${}", self.0.unsigned_abs())
        } else {
            write!(f, "${}", self.0)
        }
    }
}
