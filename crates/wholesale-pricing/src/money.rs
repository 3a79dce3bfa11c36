//! Fixed-point money.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for every amount (minor units).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// A monetary amount in the store currency.
///
/// Always held at exactly two decimal places; anything finer is rounded
/// midpoint-away-from-zero on construction. Serialized as a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Decimal", into = "Decimal")]
pub struct Money(Decimal);

impl Money {
    /// Zero, at minor-unit scale.
    pub const ZERO: Money = Money(Decimal::from_parts(0, 0, 0, false, MINOR_UNIT_SCALE));

    /// Creates an amount, rounding to minor units.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        let mut rounded =
            amount.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(MINOR_UNIT_SCALE);
        Self(rounded)
    }

    /// Creates an amount from whole currency units.
    #[must_use]
    pub fn from_major(units: i64) -> Self {
        Self::new(Decimal::from(units))
    }

    /// Creates an amount from minor units (e.g. paise).
    #[must_use]
    pub fn from_minor(minor: i64) -> Self {
        Self::new(Decimal::new(minor, MINOR_UNIT_SCALE))
    }

    /// Returns the underlying decimal amount.
    #[must_use]
    pub fn amount(self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Multiplies by a quantity. Exact, since quantities are integral.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.0 * Decimal::from(quantity))
    }

    /// Returns `percent`% of this amount, rounded to minor units.
    #[must_use]
    pub fn percent(self, percent: Decimal) -> Self {
        Self::new(self.0 * percent / Decimal::ONE_HUNDRED)
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
