//! Line items and the product snapshots they are priced from.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wholesale_core::error::{DomainError, FieldViolation};

use crate::money::Money;
use crate::tax::{TaxRate, TaxType};

/// Upper bound accepted for any unit price.
pub const MAX_UNIT_PRICE: i64 = 1_000_000_000;

fn default_minimum_order_quantity() -> u32 {
    1
}

/// A bulk price that applies once a line reaches `min_quantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTier {
    /// Smallest quantity at which this price applies.
    pub min_quantity: u32,
    /// Unit price at or above `min_quantity`.
    pub unit_price: Money,
}

/// The catalog fields copied into a cart line when a product is added.
///
/// The catalog itself is external; a line keeps the snapshot it was
/// created with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Catalog product identifier.
    pub product_id: Uuid,
    /// Display name.
    pub product_name: String,
    /// Base unit price.
    pub unit_price: Money,
    /// Smallest quantity a line of this product may hold.
    #[serde(default = "default_minimum_order_quantity")]
    pub minimum_order_quantity: u32,
    /// Tax percentage; 0 when absent.
    #[serde(default)]
    pub tax_rate: TaxRate,
    /// Whether the tax is inside or on top of the unit price.
    #[serde(default)]
    pub tax_type: TaxType,
    /// Primary product image.
    #[serde(default)]
    pub main_image_url: Option<String>,
    /// Optional bulk pricing tiers.
    #[serde(default)]
    pub price_tiers: Vec<PriceTier>,
}

impl ProductSnapshot {
    /// Checks the snapshot's own fields.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationFailed` listing every bad field.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut violations = Vec::new();
        let max_price = Money::from_major(MAX_UNIT_PRICE);

        if self.product_name.trim().is_empty() {
            violations.push(FieldViolation::new("product_name", "is required"));
        }
        if self.unit_price.is_negative() || self.unit_price > max_price {
            violations.push(FieldViolation::new(
                "unit_price",
                format!("must be between 0 and {max_price}"),
            ));
        }
        if self.minimum_order_quantity == 0 {
            violations.push(FieldViolation::new(
                "minimum_order_quantity",
                "must be at least 1",
            ));
        }
        if !self.tax_rate.is_valid() {
            violations.push(FieldViolation::new("tax_rate", "must be between 0 and 100"));
        }
        for (index, tier) in self.price_tiers.iter().enumerate() {
            if tier.min_quantity == 0 {
                violations.push(FieldViolation::new(
                    format!("price_tiers[{index}].min_quantity"),
                    "must be at least 1",
                ));
            }
            if tier.unit_price.is_negative() || tier.unit_price > max_price {
                violations.push(FieldViolation::new(
                    format!("price_tiers[{index}].unit_price"),
                    format!("must be between 0 and {max_price}"),
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ValidationFailed(violations))
        }
    }

    /// Unit price applicable at `quantity`: the tier with the largest
    /// `min_quantity` not above `quantity`, else the base price.
    #[must_use]
    pub fn unit_price_for(&self, quantity: u32) -> Money {
        self.price_tiers
            .iter()
            .filter(|tier| tier.min_quantity <= quantity)
            .max_by_key(|tier| tier.min_quantity)
            .map_or(self.unit_price, |tier| tier.unit_price)
    }
}

/// One product entry in a cart or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Identifier of this line within its cart.
    pub line_item_id: Uuid,
    /// Snapshotted product fields.
    pub product: ProductSnapshot,
    /// Ordered quantity; never below the minimum order quantity.
    pub quantity: u32,
}

impl LineItem {
    /// Creates a line. Callers are expected to have run the quantity guard.
    #[must_use]
    pub fn new(line_item_id: Uuid, product: ProductSnapshot, quantity: u32) -> Self {
        Self {
            line_item_id,
            product,
            quantity,
        }
    }

    /// Catalog product this line refers to.
    #[must_use]
    pub fn product_id(&self) -> Uuid {
        self.product.product_id
    }

    /// The line's minimum order quantity.
    #[must_use]
    pub fn minimum_order_quantity(&self) -> u32 {
        self.product.minimum_order_quantity
    }

    /// Unit price after bulk tiers.
    #[must_use]
    pub fn effective_unit_price(&self) -> Money {
        self.product.unit_price_for(self.quantity)
    }
}
