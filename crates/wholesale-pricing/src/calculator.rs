//! Pricing calculator: line totals, subtotal, shipping, grand total.
//!
//! All functions here are pure. Given the same line items they always
//! return the same amounts, so totals can be recomputed server-side at
//! checkout and compared against anything a client displayed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::line_item::LineItem;
use crate::money::Money;
use crate::tax::TaxType;

/// Subtotal above which shipping is free, in whole currency units.
pub const FREE_SHIPPING_THRESHOLD: i64 = 5000;

/// Flat shipping fee charged at or below the threshold, in whole currency units.
pub const FLAT_SHIPPING_FEE: i64 = 99;

/// Tax added on top of a line. Zero for tax-inclusive lines.
#[must_use]
pub fn line_tax(item: &LineItem) -> Money {
    match item.product.tax_type {
        TaxType::Exclusive => line_base(item).percent(item.product.tax_rate.percent()),
        TaxType::Inclusive => Money::ZERO,
    }
}

/// Total for one line: unit price × quantity, plus tax when exclusive.
#[must_use]
pub fn line_total(item: &LineItem) -> Money {
    line_base(item) + line_tax(item)
}

/// Sum of all line totals.
#[must_use]
pub fn subtotal(items: &[LineItem]) -> Money {
    items.iter().map(line_total).sum()
}

fn line_base(item: &LineItem) -> Money {
    item.effective_unit_price().times(item.quantity)
}

/// Shipping configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    /// Shipping is free once the subtotal is strictly above this amount.
    pub free_shipping_threshold: Money,
    /// Fee charged otherwise.
    pub flat_shipping_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_major(FREE_SHIPPING_THRESHOLD),
            flat_shipping_fee: Money::from_major(FLAT_SHIPPING_FEE),
        }
    }
}

impl PricingPolicy {
    /// Shipping fee for a subtotal. Exactly at the threshold still pays.
    #[must_use]
    pub fn shipping_fee(&self, subtotal: Money) -> Money {
        if subtotal > self.free_shipping_threshold {
            Money::ZERO
        } else {
            self.flat_shipping_fee
        }
    }

    /// Subtotal plus shipping.
    #[must_use]
    pub fn grand_total(&self, items: &[LineItem]) -> Money {
        let subtotal = subtotal(items);
        subtotal + self.shipping_fee(subtotal)
    }

    /// Full price breakdown for display and for order records.
    #[must_use]
    pub fn price(&self, items: &[LineItem]) -> PriceBreakdown {
        let lines: Vec<LineCharge> = items
            .iter()
            .map(|item| {
                let base = line_base(item);
                let tax = line_tax(item);
                LineCharge {
                    line_item_id: item.line_item_id,
                    unit_price: item.effective_unit_price(),
                    quantity: item.quantity,
                    base,
                    tax,
                    total: base + tax,
                }
            })
            .collect();

        let subtotal: Money = lines.iter().map(|line| line.total).sum();
        let tax_total: Money = lines.iter().map(|line| line.tax).sum();
        let shipping_fee = self.shipping_fee(subtotal);

        PriceBreakdown {
            lines,
            subtotal,
            tax_total,
            shipping_fee,
            grand_total: subtotal + shipping_fee,
        }
    }
}

/// How one line was priced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCharge {
    /// The line this charge belongs to.
    pub line_item_id: Uuid,
    /// Unit price after bulk tiers.
    pub unit_price: Money,
    /// Quantity priced.
    pub quantity: u32,
    /// Unit price × quantity.
    pub base: Money,
    /// Tax added on top (exclusive lines only).
    pub tax: Money,
    /// `base + tax`.
    pub total: Money,
}

/// Priced view of a list of line items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Per-line charges, in line order.
    pub lines: Vec<LineCharge>,
    /// Sum of line totals.
    pub subtotal: Money,
    /// Sum of tax added on top of exclusive lines.
    pub tax_total: Money,
    /// Shipping fee for the subtotal.
    pub shipping_fee: Money,
    /// `subtotal + shipping_fee`.
    pub grand_total: Money,
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::line_item::{PriceTier, ProductSnapshot};
    use crate::tax::TaxRate;

    fn item(unit_price: i64, quantity: u32, tax_rate: i64, tax_type: TaxType) -> LineItem {
        LineItem::new(
            Uuid::new_v4(),
            ProductSnapshot {
                product_id: Uuid::new_v4(),
                product_name: "Steel Rod".to_owned(),
                unit_price: Money::from_major(unit_price),
                minimum_order_quantity: 1,
                tax_rate: TaxRate::from_percent(Decimal::from(tax_rate)),
                tax_type,
                main_image_url: None,
                price_tiers: Vec::new(),
            },
            quantity,
        )
    }

    #[test]
    fn test_exclusive_tax_is_added_on_top() {
        // 100 × 5 + 18% of 500
        let line = item(100, 5, 18, TaxType::Exclusive);

        assert_eq!(line_total(&line), Money::from_major(590));
        assert_eq!(line_tax(&line), Money::from_major(90));
    }

    #[test]
    fn test_inclusive_tax_is_not_added() {
        let line = item(100, 5, 18, TaxType::Inclusive);

        assert_eq!(line_total(&line), Money::from_major(500));
        assert_eq!(line_tax(&line), Money::ZERO);
    }

    #[test]
    fn test_zero_rate_exclusive_line_equals_base() {
        let line = item(40, 3, 0, TaxType::Exclusive);

        assert_eq!(line_total(&line), Money::from_major(120));
    }

    #[test]
    fn test_line_total_is_repeatable() {
        let line = item(333, 7, 12, TaxType::Exclusive);

        let first = line_total(&line);
        let second = line_total(&line);

        assert_eq!(first, second);
        assert_eq!(line.quantity, 7);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let items = vec![
            item(100, 5, 18, TaxType::Exclusive),
            item(200, 2, 5, TaxType::Inclusive),
        ];

        assert_eq!(subtotal(&items), Money::from_major(990));
        assert_eq!(subtotal(&[]), Money::ZERO);
    }

    #[test]
    fn test_shipping_fee_boundary() {
        let policy = PricingPolicy::default();

        assert_eq!(
            policy.shipping_fee(Money::from_major(4999)),
            Money::from_major(FLAT_SHIPPING_FEE)
        );
        assert_eq!(
            policy.shipping_fee(Money::from_major(5000)),
            Money::from_major(FLAT_SHIPPING_FEE)
        );
        assert_eq!(policy.shipping_fee(Money::from_minor(500_001)), Money::ZERO);
    }

    #[test]
    fn test_custom_policy_values_are_used() {
        let policy = PricingPolicy {
            free_shipping_threshold: Money::from_major(1000),
            flat_shipping_fee: Money::from_major(500),
        };

        assert_eq!(policy.shipping_fee(Money::from_major(1000)), Money::from_major(500));
        assert_eq!(policy.shipping_fee(Money::from_major(1001)), Money::ZERO);
    }

    #[test]
    fn test_grand_total_below_threshold_adds_flat_fee() {
        let policy = PricingPolicy::default();
        let items = vec![item(100, 5, 18, TaxType::Exclusive)];

        assert_eq!(policy.grand_total(&items), Money::from_major(590 + FLAT_SHIPPING_FEE));
    }

    #[test]
    fn test_grand_total_above_threshold_ships_free() {
        let policy = PricingPolicy::default();
        let items = vec![item(1000, 6, 0, TaxType::Inclusive)];

        let breakdown = policy.price(&items);

        assert_eq!(breakdown.subtotal, Money::from_major(6000));
        assert_eq!(breakdown.shipping_fee, Money::ZERO);
        assert_eq!(breakdown.grand_total, breakdown.subtotal);
    }

    #[test]
    fn test_breakdown_uses_tier_price() {
        let mut line = item(100, 25, 10, TaxType::Exclusive);
        line.product.price_tiers = vec![PriceTier {
            min_quantity: 20,
            unit_price: Money::from_major(90),
        }];

        let breakdown = PricingPolicy::default().price(std::slice::from_ref(&line));

        let charge = &breakdown.lines[0];
        assert_eq!(charge.unit_price, Money::from_major(90));
        assert_eq!(charge.base, Money::from_major(2250));
        assert_eq!(charge.tax, Money::from_minor(22_500));
        assert_eq!(charge.total, Money::from_major(2475));
        assert_eq!(breakdown.tax_total, Money::from_major(225));
        assert_eq!(breakdown.subtotal, line_total(&line));
    }

    #[test]
    fn test_tax_is_rounded_per_line() {
        // 0.33 × 1 at 5% = 0.0165 → 0.02
        let mut line = item(0, 1, 5, TaxType::Exclusive);
        line.product.unit_price = Money::from_minor(33);

        assert_eq!(line_tax(&line), Money::from_minor(2));
        assert_eq!(line_total(&line), Money::from_minor(35));
    }
}
