//! Command handlers for the Orders context.

use tracing::info;
use uuid::Uuid;
use wholesale_core::aggregate::AggregateRoot;
use wholesale_core::clock::Clock;
use wholesale_core::error::DomainError;
use wholesale_core::event::{DomainEvent, EventMetadata};
use wholesale_core::repository::{EventRepository, StoredEvent};

use crate::domain::aggregates::Order;
use crate::domain::commands::ChangeOrderStatus;
use crate::domain::events::{OrderEvent, OrderEventKind};

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct OrderCommandResult {
    /// The order affected by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
    /// The order after the command.
    pub order: Order,
}

/// Reconstitutes an `Order` from stored events.
///
/// # Errors
///
/// Returns `DomainError::Internal` if event deserialization fails.
pub(crate) fn reconstitute(
    order_id: Uuid,
    existing_events: &[StoredEvent],
) -> Result<Order, DomainError> {
    let mut order = Order::new(order_id);
    for stored in existing_events {
        let kind: OrderEventKind = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DomainError::Internal(format!("event deserialization failed: {e}")))?;
        order.apply(&OrderEvent {
            metadata: EventMetadata::from_stored(stored),
            kind,
        });
    }
    Ok(order)
}

/// Loads a placed order.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no order exists with this id.
pub(crate) async fn load_order(
    order_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<Order, DomainError> {
    let existing_events = repo.load_events(order_id).await?;
    let order = reconstitute(order_id, &existing_events)?;
    if !order.is_placed() {
        return Err(DomainError::not_found("order", order_id));
    }
    Ok(order)
}

/// Persists the order's uncommitted events at its loaded version.
///
/// # Errors
///
/// Returns `DomainError::ConcurrencyConflict` if the stream moved, or any
/// other repository error.
pub(crate) async fn save(
    order: &mut Order,
    repo: &dyn EventRepository,
) -> Result<Vec<StoredEvent>, DomainError> {
    let stored_events: Vec<StoredEvent> = order
        .uncommitted_events()
        .iter()
        .map(DomainEvent::to_stored)
        .collect();
    repo.append_events(order.id, order.version(), &stored_events)
        .await?;
    order.mark_committed();
    Ok(stored_events)
}

/// Handles the `ChangeOrderStatus` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown order,
/// `DomainError::InvalidTransition` for an illegal change, or a
/// repository error.
pub async fn handle_change_status(
    command: &ChangeOrderStatus,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<OrderCommandResult, DomainError> {
    let mut order = load_order(command.order_id, repo).await?;
    let from = order.status();

    order.change_status(command.status, command.correlation_id, clock)?;
    let stored_events = save(&mut order, repo).await?;

    info!(
        order_id = %order.id,
        %from,
        to = %order.status(),
        correlation_id = %command.correlation_id,
        "order status changed"
    );
    Ok(OrderCommandResult {
        aggregate_id: order.id,
        stored_events,
        order,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use wholesale_pricing::{LineItem, Money, PricingPolicy, ProductSnapshot, TaxRate, TaxType};
    use wholesale_test_support::{
        EmptyEventRepository, FixedClock, RecordingEventRepository, stored_event,
    };

    use super::*;
    use crate::domain::address::ShippingAddress;
    use crate::domain::aggregates::NewOrder;
    use crate::domain::events::ORDER_STATUS_CHANGED_EVENT_TYPE;
    use crate::domain::status::OrderStatus;

    fn placed_order_events(order_id: Uuid, clock: &FixedClock) -> Vec<StoredEvent> {
        let items = vec![LineItem::new(
            Uuid::new_v4(),
            ProductSnapshot {
                product_id: Uuid::new_v4(),
                product_name: "Dal 30kg".to_owned(),
                unit_price: Money::from_major(3_000),
                minimum_order_quantity: 1,
                tax_rate: TaxRate::ZERO,
                tax_type: TaxType::Inclusive,
                main_image_url: None,
                price_tiers: Vec::new(),
            },
            1,
        )];
        let mut order = Order::new(order_id);
        order.place(
            NewOrder {
                owner_id: Uuid::new_v4(),
                cart_id: Uuid::new_v4(),
                cart_version: 1,
                shipping_address: ShippingAddress::default(),
                pricing: PricingPolicy::default().price(&items),
                items,
            },
            Uuid::new_v4(),
            clock,
        );
        order
            .uncommitted_events()
            .iter()
            .map(DomainEvent::to_stored)
            .collect()
    }

    #[tokio::test]
    async fn test_handle_change_status_persists_status_changed_event() {
        // Arrange
        let order_id = Uuid::new_v4();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 3, 11, 0, 0).unwrap());
        let repo = RecordingEventRepository::new(placed_order_events(order_id, &clock));
        let command = ChangeOrderStatus {
            correlation_id: Uuid::new_v4(),
            order_id,
            status: OrderStatus::Confirmed,
        };

        // Act
        let result = handle_change_status(&command, &clock, &repo).await.unwrap();

        // Assert
        assert_eq!(result.order.status(), OrderStatus::Confirmed);
        let appended = repo.appended_events();
        assert_eq!(appended.len(), 1);
        let (aggregate_id, expected_version, events) = &appended[0];
        assert_eq!(*aggregate_id, order_id);
        assert_eq!(*expected_version, 1);
        assert_eq!(events[0].event_type, ORDER_STATUS_CHANGED_EVENT_TYPE);
        assert_eq!(events[0].sequence_number, 2);
        assert_eq!(events[0].correlation_id, command.correlation_id);
    }

    #[tokio::test]
    async fn test_handle_change_status_rejects_illegal_transition() {
        let order_id = Uuid::new_v4();
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 3, 11, 0, 0).unwrap());
        let repo = RecordingEventRepository::new(placed_order_events(order_id, &clock));

        let err = handle_change_status(
            &ChangeOrderStatus {
                correlation_id: Uuid::new_v4(),
                order_id,
                status: OrderStatus::Shipped,
            },
            &clock,
            &repo,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert!(repo.appended_events().is_empty());
    }

    #[tokio::test]
    async fn test_handle_change_status_unknown_order_is_not_found() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 3, 11, 0, 0).unwrap());

        let err = handle_change_status(
            &ChangeOrderStatus {
                correlation_id: Uuid::new_v4(),
                order_id: Uuid::new_v4(),
                status: OrderStatus::Confirmed,
            },
            &clock,
            &EmptyEventRepository,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DomainError::NotFound { resource: "order", .. }));
    }

    #[test]
    fn test_reconstitute_rejects_corrupt_payload() {
        let order_id = Uuid::new_v4();
        let corrupt = stored_event(
            order_id,
            1,
            "order.placed",
            serde_json::json!({"OrderPlaced": {"order_id": 7}}),
            Utc::now(),
        );

        let err = reconstitute(order_id, &[corrupt]).unwrap_err();

        assert!(matches!(err, DomainError::Internal(_)));
    }
}
