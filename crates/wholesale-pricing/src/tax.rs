//! Tax regime and rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How a product's tax rate relates to its unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    /// Tax is already embedded in the unit price.
    #[default]
    Inclusive,
    /// Tax is added on top of unit price × quantity.
    Exclusive,
}

/// A tax rate expressed as a percentage (18 means 18%). Defaults to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// No tax.
    pub const ZERO: TaxRate = TaxRate(Decimal::ZERO);

    /// Creates a rate from a percentage.
    #[must_use]
    pub fn from_percent(percent: Decimal) -> Self {
        Self(percent)
    }

    /// Returns the rate as a percentage.
    #[must_use]
    pub fn percent(self) -> Decimal {
        self.0
    }

    /// Returns `true` if the rate lies within `0..=100`.
    #[must_use]
    pub fn is_valid(self) -> bool {
        self.0 >= Decimal::ZERO && self.0 <= Decimal::ONE_HUNDRED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_type_defaults_to_inclusive() {
        assert_eq!(TaxType::default(), TaxType::Inclusive);
    }

    #[test]
    fn test_tax_type_wire_names() {
        let parsed: TaxType = serde_json::from_str("\"exclusive\"").unwrap();
        assert_eq!(parsed, TaxType::Exclusive);
        assert!(serde_json::from_str::<TaxType>("\"vat\"").is_err());
    }

    #[test]
    fn test_rate_bounds() {
        assert!(TaxRate::ZERO.is_valid());
        assert!(TaxRate::from_percent(Decimal::ONE_HUNDRED).is_valid());
        assert!(!TaxRate::from_percent(Decimal::from(-1)).is_valid());
        assert!(!TaxRate::from_percent(Decimal::from(101)).is_valid());
    }
}
