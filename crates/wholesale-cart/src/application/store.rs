//! Cart persistence: loading, reconstitution and saving.
//!
//! Loading also settles a cart left behind by an interrupted checkout: if
//! an order already exists for the cart's current contents, the cart is
//! emptied before anyone else sees it.

use tracing::warn;
use uuid::Uuid;
use wholesale_core::aggregate::AggregateRoot;
use wholesale_core::clock::Clock;
use wholesale_core::error::DomainError;
use wholesale_core::event::{DomainEvent, EventMetadata};
use wholesale_core::repository::{EventRepository, StoredEvent};

use crate::domain::aggregates::Cart;
use crate::domain::events::{CartEvent, CartEventKind, OrderedLine};
use crate::domain::ids::{cart_id_for, checkout_order_id};

/// Reconstitutes a `Cart` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Internal` if event deserialization fails.
pub fn reconstitute(owner_id: Uuid, existing_events: &[StoredEvent]) -> Result<Cart, DomainError> {
    let mut cart = Cart::new(owner_id);
    for stored in existing_events {
        let kind: CartEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DomainError::Internal(format!("event deserialization failed: {e}")))?;
        cart.apply(&CartEvent {
            metadata: EventMetadata::from_stored(stored),
            kind,
        });
    }
    Ok(cart)
}

/// Loads an owner's cart exactly as stored.
///
/// An owner with no history gets an empty cart at version 0.
///
/// # Errors
///
/// Returns `DomainError` if loading or deserialization fails.
pub async fn load_raw(owner_id: Uuid, repo: &dyn EventRepository) -> Result<Cart, DomainError> {
    let existing_events = repo.load_events(cart_id_for(owner_id)).await?;
    reconstitute(owner_id, &existing_events)
}

/// Loads an owner's cart, clearing it first if its current contents were
/// already turned into an order.
///
/// # Errors
///
/// Returns `DomainError` if loading, deserialization or the clearing
/// append fails.
pub async fn load_cart(
    owner_id: Uuid,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<Cart, DomainError> {
    let mut cart = load_raw(owner_id, repo).await?;
    if cart.is_empty() {
        return Ok(cart);
    }

    let order_id = checkout_order_id(cart.id, cart.version);
    if repo.load_events(order_id).await?.is_empty() {
        return Ok(cart);
    }

    warn!(
        cart_id = %cart.id,
        %order_id,
        version = cart.version,
        "clearing cart whose contents were already ordered"
    );
    let ordered: Vec<OrderedLine> = cart.items().iter().map(OrderedLine::from).collect();
    cart.check_out(order_id, &ordered, Uuid::new_v4(), clock);
    save(&mut cart, repo).await?;
    Ok(cart)
}

/// Persists the cart's uncommitted events at its loaded version.
///
/// # Errors
///
/// Returns `DomainError::ConcurrencyConflict` if the stream moved since the
/// cart was loaded, or any other repository error.
pub async fn save(
    cart: &mut Cart,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events: Vec<StoredEvent> = cart
        .uncommitted_events()
        .iter()
        .map(DomainEvent::to_stored)
        .collect();
    if stored_events.is_empty() {
        return Ok(stored_events);
    }

    repo.append_events(cart.id, cart.version(), &stored_events).await?;
    cart.mark_committed();
    Ok(stored_events)
}
