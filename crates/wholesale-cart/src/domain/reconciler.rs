//! Line-item reconciliation.
//!
//! A cart holds at most one line per product. Adding a product that is
//! already present grows the existing line instead of creating a second
//! one.

use uuid::Uuid;
use wholesale_core::error::DomainError;
use wholesale_pricing::{LineItem, ProductSnapshot};

use super::quantity_guard;

/// Outcome of reconciling an add against the current lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The product was already present; its line grows.
    Merged {
        /// Existing line that absorbs the quantity.
        line_item_id: Uuid,
        /// Quantity added by this request.
        added: u32,
        /// Resulting line quantity.
        quantity: u32,
    },
    /// The product was not present; a new line is appended.
    Appended(LineItem),
}

/// Decides how adding `quantity` of `product` changes `items`.
///
/// A merged line keeps the snapshot it was created with. Only new lines
/// are checked against the minimum order quantity, since an existing line
/// already satisfies it and a merge only grows it.
///
/// # Errors
///
/// Returns `DomainError::InvalidQuantity` for a non-positive quantity and
/// `DomainError::BelowMinimumOrderQuantity` for a new line under its minimum.
pub fn reconcile(
    items: &[LineItem],
    product: &ProductSnapshot,
    quantity: i64,
    new_line_item_id: Uuid,
) -> Result<Reconciliation, DomainError> {
    let added = quantity_guard::validate_requested(quantity)?;

    if let Some(existing) = items
        .iter()
        .find(|item| item.product_id() == product.product_id)
    {
        let quantity = existing
            .quantity
            .checked_add(added)
            .ok_or(DomainError::InvalidQuantity { quantity })?;
        return Ok(Reconciliation::Merged {
            line_item_id: existing.line_item_id,
            added,
            quantity,
        });
    }

    let accepted = quantity_guard::check_minimum(product.minimum_order_quantity, quantity)?;
    Ok(Reconciliation::Appended(LineItem::new(
        new_line_item_id,
        product.clone(),
        accepted,
    )))
}

/// Applies a reconciliation to a list of lines.
pub fn apply(items: &mut Vec<LineItem>, reconciliation: &Reconciliation) {
    match reconciliation {
        Reconciliation::Merged {
            line_item_id,
            quantity,
            ..
        } => {
            if let Some(item) = items
                .iter_mut()
                .find(|item| item.line_item_id == *line_item_id)
            {
                item.quantity = *quantity;
            }
        }
        Reconciliation::Appended(item) => items.push(item.clone()),
    }
}

/// Builds a fresh line list from requested `(product, quantity)` pairs,
/// merging duplicates in request order.
///
/// `line_id_for` chooses the identifier of each new line, letting callers
/// keep identifiers stable across a wholesale replacement.
///
/// # Errors
///
/// Returns the first error produced by [`reconcile`].
pub fn reconcile_all<'a, I, F>(requested: I, mut line_id_for: F) -> Result<Vec<LineItem>, DomainError>
where
    I: IntoIterator<Item = (&'a ProductSnapshot, i64)>,
    F: FnMut(Uuid) -> Uuid,
{
    let mut items = Vec::new();
    for (product, quantity) in requested {
        let outcome = reconcile(&items, product, quantity, line_id_for(product.product_id))?;
        apply(&mut items, &outcome);
    }
    Ok(items)
}
