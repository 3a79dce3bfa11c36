//! Commands for the Orders context.

use uuid::Uuid;
use wholesale_core::command::Command;
use wholesale_pricing::Money;

use super::address::ShippingAddress;
use super::status::OrderStatus;

/// Command to check out the owner's cart.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The customer checking out.
    pub owner_id: Uuid,
    /// Where to ship.
    pub shipping_address: ShippingAddress,
    /// Total the client displayed. Never used for pricing.
    pub client_total: Option<Money>,
}

impl Command for PlaceOrder {
    fn command_type(&self) -> &'static str {
        "order.place"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to move an order to a new status.
#[derive(Debug, Clone)]
pub struct ChangeOrderStatus {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The order identifier.
    pub order_id: Uuid,
    /// Requested status.
    pub status: OrderStatus,
}

impl Command for ChangeOrderStatus {
    fn command_type(&self) -> &'static str {
        "order.change_status"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
