//! Commands for the Cart context.
//!
//! Quantities arrive as signed integers so that zero and negative
//! requests reach the quantity guard and are rejected there.

use uuid::Uuid;
use wholesale_core::command::Command;
use wholesale_pricing::ProductSnapshot;

use super::events::OrderedLine;

/// Command to add a product to the owner's cart.
#[derive(Debug, Clone)]
pub struct AddItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
    /// Product fields to snapshot into the line.
    pub product: ProductSnapshot,
    /// Requested quantity.
    pub quantity: i64,
}

impl Command for AddItem {
    fn command_type(&self) -> &'static str {
        "cart.add_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to set a line to an exact quantity.
#[derive(Debug, Clone)]
pub struct SetQuantity {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
    /// The line to change.
    pub line_item_id: Uuid,
    /// New quantity.
    pub quantity: i64,
}

impl Command for SetQuantity {
    fn command_type(&self) -> &'static str {
        "cart.set_quantity"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to change a line's quantity by a signed step.
#[derive(Debug, Clone)]
pub struct AdjustQuantity {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
    /// The line to change.
    pub line_item_id: Uuid,
    /// Amount to add; negative to decrement.
    pub delta: i64,
}

impl Command for AdjustQuantity {
    fn command_type(&self) -> &'static str {
        "cart.adjust_quantity"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to remove a line.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
    /// The line to remove.
    pub line_item_id: Uuid,
}

impl Command for RemoveItem {
    fn command_type(&self) -> &'static str {
        "cart.remove_item"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// One line of a wholesale replacement.
#[derive(Debug, Clone)]
pub struct RequestedLine {
    /// Product fields to snapshot.
    pub product: ProductSnapshot,
    /// Requested quantity.
    pub quantity: i64,
}

/// Command to replace every line in the cart.
#[derive(Debug, Clone)]
pub struct ReplaceItems {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
    /// The new contents.
    pub items: Vec<RequestedLine>,
}

impl Command for ReplaceItems {
    fn command_type(&self) -> &'static str {
        "cart.replace_items"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to empty the cart.
#[derive(Debug, Clone)]
pub struct ClearCart {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
}

impl Command for ClearCart {
    fn command_type(&self) -> &'static str {
        "cart.clear"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to empty the cart after its contents became an order.
#[derive(Debug, Clone)]
pub struct CheckOutCart {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
    /// The cart version the order was built from.
    pub cart_version: i64,
    /// The placed order.
    pub order_id: Uuid,
    /// The lines and quantities the order took.
    pub lines: Vec<OrderedLine>,
}

impl Command for CheckOutCart {
    fn command_type(&self) -> &'static str {
        "cart.check_out"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to record that an abandoned-cart reminder was sent.
#[derive(Debug, Clone)]
pub struct RecordReminder {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The cart owner.
    pub owner_id: Uuid,
}

impl Command for RecordReminder {
    fn command_type(&self) -> &'static str {
        "cart.record_reminder"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
