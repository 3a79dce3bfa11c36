//! Minimum-order-quantity guard.
//!
//! Every quantity-changing path goes through here. Out-of-range values
//! are rejected, never clamped.

use wholesale_core::error::DomainError;
use wholesale_pricing::LineItem;

/// Checks that a requested quantity is positive and representable.
///
/// # Errors
///
/// Returns `DomainError::InvalidQuantity` if `quantity <= 0` or too large.
pub fn validate_requested(quantity: i64) -> Result<u32, DomainError> {
    if quantity <= 0 {
        return Err(DomainError::InvalidQuantity { quantity });
    }
    u32::try_from(quantity).map_err(|_| DomainError::InvalidQuantity { quantity })
}

/// Checks `quantity` against a minimum order quantity.
///
/// # Errors
///
/// Returns `DomainError::InvalidQuantity` for non-positive quantities and
/// `DomainError::BelowMinimumOrderQuantity` when `quantity < minimum`.
pub fn check_minimum(minimum: u32, quantity: i64) -> Result<u32, DomainError> {
    let accepted = validate_requested(quantity)?;
    if accepted < minimum {
        return Err(DomainError::BelowMinimumOrderQuantity {
            minimum,
            requested: quantity,
        });
    }
    Ok(accepted)
}

/// Validates setting `item` to `new_quantity`.
///
/// # Errors
///
/// See [`check_minimum`].
pub fn validate_set(item: &LineItem, new_quantity: i64) -> Result<u32, DomainError> {
    check_minimum(item.minimum_order_quantity(), new_quantity)
}

/// Validates changing `item` by `delta` and returns the resulting quantity.
///
/// # Errors
///
/// See [`check_minimum`].
pub fn validate_delta(item: &LineItem, delta: i64) -> Result<u32, DomainError> {
    let new_quantity = i64::from(item.quantity).saturating_add(delta);
    validate_set(item, new_quantity)
}
