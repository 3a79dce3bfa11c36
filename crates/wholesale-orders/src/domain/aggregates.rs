//! Aggregate roots for the Orders context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use wholesale_core::aggregate::AggregateRoot;
use wholesale_core::clock::Clock;
use wholesale_core::error::DomainError;
use wholesale_core::event::EventMetadata;
use wholesale_pricing::{LineItem, PriceBreakdown};

use super::address::ShippingAddress;
use super::events::{OrderEvent, OrderEventKind, OrderPlaced, OrderStatusChanged};
use super::status::OrderStatus;

/// Formats the order number for `order_id` placed at `placed_at`:
/// `WO-YYYYMMDD-` followed by the first twelve hex digits of the id.
#[must_use]
pub fn order_number(order_id: Uuid, placed_at: DateTime<Utc>) -> String {
    let hex = order_id.simple().to_string();
    format!(
        "WO-{}-{}",
        placed_at.format("%Y%m%d"),
        hex[..12].to_ascii_uppercase()
    )
}

/// One entry of an order's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    /// Status entered.
    pub status: OrderStatus,
    /// When it was entered.
    pub changed_at: DateTime<Utc>,
}

/// Everything checkout supplies to place an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// The customer placing the order.
    pub owner_id: Uuid,
    /// The cart being checked out.
    pub cart_id: Uuid,
    /// The cart version that was priced.
    pub cart_version: i64,
    /// Validated shipping address.
    pub shipping_address: ShippingAddress,
    /// Copy of the cart lines.
    pub items: Vec<LineItem>,
    /// Server-side pricing of `items`.
    pub pricing: PriceBreakdown,
}

/// The aggregate root for an order.
///
/// Everything except the status is fixed once the order is placed.
#[derive(Debug)]
pub struct Order {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub(crate) version: i64,
    pub(crate) order_number: String,
    pub(crate) owner_id: Uuid,
    pub(crate) cart_id: Uuid,
    pub(crate) shipping_address: ShippingAddress,
    pub(crate) items: Vec<LineItem>,
    pub(crate) pricing: PriceBreakdown,
    pub(crate) status: OrderStatus,
    pub(crate) status_history: Vec<StatusChange>,
    pub(crate) placed_at: Option<DateTime<Utc>>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<OrderEvent>,
}

impl Order {
    /// Creates an unplaced order shell for reconstitution or placement.
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            version: 0,
            order_number: String::new(),
            owner_id: Uuid::nil(),
            cart_id: Uuid::nil(),
            shipping_address: ShippingAddress::default(),
            items: Vec::new(),
            pricing: PriceBreakdown::default(),
            status: OrderStatus::Pending,
            status_history: Vec::new(),
            placed_at: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns `true` once `OrderPlaced` has been applied or recorded.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        self.placed_at.is_some()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Human-facing order number.
    #[must_use]
    pub fn order_number(&self) -> &str {
        &self.order_number
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: OrderEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = OrderEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.mutate(&event.kind);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, kind: &OrderEventKind) {
        match kind {
            OrderEventKind::OrderPlaced(placed) => {
                self.order_number.clone_from(&placed.order_number);
                self.owner_id = placed.owner_id;
                self.cart_id = placed.cart_id;
                self.shipping_address = placed.shipping_address.clone();
                self.items.clone_from(&placed.items);
                self.pricing = placed.pricing.clone();
                self.status = OrderStatus::Pending;
                self.status_history = vec![StatusChange {
                    status: OrderStatus::Pending,
                    changed_at: placed.placed_at,
                }];
                self.placed_at = Some(placed.placed_at);
            }
            OrderEventKind::OrderStatusChanged(changed) => {
                self.status = changed.to;
                self.status_history.push(StatusChange {
                    status: changed.to,
                    changed_at: changed.changed_at,
                });
            }
        }
    }

    /// Places the order with status `pending`, producing an `OrderPlaced`
    /// event.
    pub fn place(&mut self, new_order: NewOrder, correlation_id: Uuid, clock: &dyn Clock) {
        let placed_at = clock.now();
        self.record(
            OrderEventKind::OrderPlaced(Box::new(OrderPlaced {
                order_id: self.id,
                order_number: order_number(self.id, placed_at),
                owner_id: new_order.owner_id,
                cart_id: new_order.cart_id,
                cart_version: new_order.cart_version,
                shipping_address: new_order.shipping_address,
                items: new_order.items,
                pricing: new_order.pricing,
                placed_at,
            })),
            correlation_id,
            clock,
        );
    }

    /// Moves the order to `next`, producing an `OrderStatusChanged` event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the state machine does
    /// not allow the change.
    pub fn change_status(
        &mut self,
        next: OrderStatus,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let from = self.status;
        let to = from.transition(next)?;
        self.record(
            OrderEventKind::OrderStatusChanged(OrderStatusChanged {
                order_id: self.id,
                from,
                to,
                changed_at: clock.now(),
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }
}

impl AggregateRoot for Order {
    type Event = OrderEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(&event.kind);
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    #[allow(clippy::cast_possible_wrap)]
    fn mark_committed(&mut self) {
        self.version += self.uncommitted_events.len() as i64;
        self.uncommitted_events.clear();
    }
}
