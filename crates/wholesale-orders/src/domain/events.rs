//! Domain events for the Orders context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wholesale_core::event::{DomainEvent, EventMetadata};
use wholesale_pricing::{LineItem, PriceBreakdown};

use super::address::ShippingAddress;
use super::status::OrderStatus;

/// Event type for `OrderPlaced`.
pub const ORDER_PLACED_EVENT_TYPE: &str = "order.placed";
/// Event type for `OrderStatusChanged`.
pub const ORDER_STATUS_CHANGED_EVENT_TYPE: &str = "order.status_changed";

/// Emitted once, when checkout turns a cart into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    /// The order identifier.
    pub order_id: Uuid,
    /// Human-facing order number.
    pub order_number: String,
    /// The customer who placed the order.
    pub owner_id: Uuid,
    /// The cart the order was built from.
    pub cart_id: Uuid,
    /// The cart version the order was priced from.
    pub cart_version: i64,
    /// Validated shipping address.
    pub shipping_address: ShippingAddress,
    /// Copy of the cart lines at checkout.
    pub items: Vec<LineItem>,
    /// Server-side pricing of `items`.
    pub pricing: PriceBreakdown,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
}

/// Emitted when an admin moves the order to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusChanged {
    /// The order identifier.
    pub order_id: Uuid,
    /// Status before the change.
    pub from: OrderStatus,
    /// Status after the change.
    pub to: OrderStatus,
    /// When the change happened.
    pub changed_at: DateTime<Utc>,
}

/// Event payload variants for the Orders context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderEventKind {
    /// The order was placed.
    OrderPlaced(Box<OrderPlaced>),
    /// The order's status changed.
    OrderStatusChanged(OrderStatusChanged),
}

impl OrderEventKind {
    /// Returns the stored event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::OrderPlaced(_) => ORDER_PLACED_EVENT_TYPE,
            Self::OrderStatusChanged(_) => ORDER_STATUS_CHANGED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Orders context.
#[derive(Debug, Clone)]
pub struct OrderEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: OrderEventKind,
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("OrderEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
