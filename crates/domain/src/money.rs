//! Monetary amounts as integer cents.

use serde::{Deserialize, Serialize};

/// A monetary amount stored as integer cents.
///
/// Avoids floating-point rounding in price sums and refund amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money {
    /// Amount in cents (e.g., 2500 = $25.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Adds another money amount, saturating at the representable bounds
    /// instead of wrapping.
    pub fn add(&self, other: Money) -> Money {
        Money {
            cents: self.cents.saturating_add(other.cents),
        }
    }

    /// Adds another money amount, returning `None` on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.cents
            .checked_add(other.cents)
            .map(|cents| Money { cents })
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc.add(m))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", (self.cents / 100).abs(), self.cents.abs() % 100)
        } else {
            write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
        }
    }
}
