//! Query handlers for the Cart context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use wholesale_core::aggregate::AggregateRoot;
use wholesale_core::clock::Clock;
use wholesale_core::error::DomainError;
use wholesale_core::repository::EventRepository;
use wholesale_pricing::{LineItem, PriceBreakdown, PricingPolicy};

use crate::application::store;
use crate::domain::aggregates::Cart;

/// Read-only view of a cart with its current pricing.
#[derive(Debug, Serialize)]
pub struct CartView {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
    /// Lines in insertion order.
    pub items: Vec<LineItem>,
    /// Totals computed from `items`.
    pub pricing: PriceBreakdown,
    /// When the cart last changed.
    pub updated_at: Option<DateTime<Utc>>,
    /// When the last abandoned-cart reminder went out.
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Current version (event count).
    pub version: i64,
}

impl CartView {
    /// Prices `cart` under `policy`.
    #[must_use]
    pub fn from_cart(cart: &Cart, policy: &PricingPolicy) -> Self {
        Self {
            cart_id: cart.id,
            owner_id: cart.owner_id,
            items: cart.items().to_vec(),
            pricing: policy.price(cart.items()),
            updated_at: cart.updated_at(),
            last_notified_at: cart.last_notified_at(),
            version: cart.version(),
        }
    }
}

/// Retrieves the owner's cart. An owner with no cart sees an empty one.
///
/// # Errors
///
/// Returns `DomainError` if loading or deserialization fails.
pub async fn get_cart(
    owner_id: Uuid,
    policy: &PricingPolicy,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartView, DomainError> {
    let cart = store::load_cart(owner_id, clock, repo).await?;
    Ok(CartView::from_cart(&cart, policy))
}
