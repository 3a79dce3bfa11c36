//! Domain events for the Cart context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wholesale_core::event::{DomainEvent, EventMetadata};
use wholesale_pricing::LineItem;

/// Event type for `LineItemAdded`.
pub const LINE_ITEM_ADDED_EVENT_TYPE: &str = "cart.line_item_added";
/// Event type for `LineItemQuantityIncreased`.
pub const LINE_ITEM_QUANTITY_INCREASED_EVENT_TYPE: &str = "cart.line_item_quantity_increased";
/// Event type for `LineItemQuantityChanged`.
pub const LINE_ITEM_QUANTITY_CHANGED_EVENT_TYPE: &str = "cart.line_item_quantity_changed";
/// Event type for `LineItemRemoved`.
pub const LINE_ITEM_REMOVED_EVENT_TYPE: &str = "cart.line_item_removed";
/// Event type for `CartItemsReplaced`.
pub const CART_ITEMS_REPLACED_EVENT_TYPE: &str = "cart.items_replaced";
/// Event type for `CartCleared`.
pub const CART_CLEARED_EVENT_TYPE: &str = "cart.cleared";
/// Event type for `CartCheckedOut`.
pub const CART_CHECKED_OUT_EVENT_TYPE: &str = "cart.checked_out";
/// Event type for `ReminderRecorded`.
pub const REMINDER_RECORDED_EVENT_TYPE: &str = "cart.reminder_recorded";

/// Emitted when a product is added as a new line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemAdded {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The new line, including its product snapshot.
    pub line_item: LineItem,
}

/// Emitted when an add merges into an existing line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemQuantityIncreased {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The line that grew.
    pub line_item_id: Uuid,
    /// Quantity added.
    pub added: u32,
    /// Resulting quantity.
    pub quantity: u32,
}

/// Emitted when a line's quantity is set or adjusted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemQuantityChanged {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The line that changed.
    pub line_item_id: Uuid,
    /// Quantity before the change.
    pub previous_quantity: u32,
    /// Quantity after the change.
    pub quantity: u32,
}

/// Emitted when a line is removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemRemoved {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The removed line.
    pub line_item_id: Uuid,
}

/// Emitted when the whole line list is replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemsReplaced {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The new lines.
    pub items: Vec<LineItem>,
}

/// Emitted when the owner empties the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartCleared {
    /// The cart identifier.
    pub cart_id: Uuid,
}

/// A line and the quantity of it that went into an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedLine {
    /// The cart line the quantity was taken from.
    pub line_item_id: Uuid,
    /// Units ordered.
    pub quantity: u32,
}

impl From<&LineItem> for OrderedLine {
    fn from(item: &LineItem) -> Self {
        Self {
            line_item_id: item.line_item_id,
            quantity: item.quantity,
        }
    }
}

/// Emitted when the cart's contents became an order.
///
/// Only the ordered quantities leave the cart. Anything added after the
/// order was priced stays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartCheckedOut {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// The order that was placed.
    pub order_id: Uuid,
    /// What the order took from the cart.
    pub lines: Vec<OrderedLine>,
}

/// Emitted when an abandoned-cart reminder was sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderRecorded {
    /// The cart identifier.
    pub cart_id: Uuid,
    /// When the reminder went out.
    pub notified_at: DateTime<Utc>,
}

/// Event payload variants for the Cart context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CartEventKind {
    /// A new line was added.
    LineItemAdded(LineItemAdded),
    /// An existing line grew through a repeated add.
    LineItemQuantityIncreased(LineItemQuantityIncreased),
    /// A line's quantity was set or adjusted.
    LineItemQuantityChanged(LineItemQuantityChanged),
    /// A line was removed.
    LineItemRemoved(LineItemRemoved),
    /// All lines were replaced.
    CartItemsReplaced(CartItemsReplaced),
    /// The cart was emptied by its owner.
    CartCleared(CartCleared),
    /// The cart was emptied by checkout.
    CartCheckedOut(CartCheckedOut),
    /// A reminder notification was recorded.
    ReminderRecorded(ReminderRecorded),
}

impl CartEventKind {
    /// Returns the stored event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::LineItemAdded(_) => LINE_ITEM_ADDED_EVENT_TYPE,
            Self::LineItemQuantityIncreased(_) => LINE_ITEM_QUANTITY_INCREASED_EVENT_TYPE,
            Self::LineItemQuantityChanged(_) => LINE_ITEM_QUANTITY_CHANGED_EVENT_TYPE,
            Self::LineItemRemoved(_) => LINE_ITEM_REMOVED_EVENT_TYPE,
            Self::CartItemsReplaced(_) => CART_ITEMS_REPLACED_EVENT_TYPE,
            Self::CartCleared(_) => CART_CLEARED_EVENT_TYPE,
            Self::CartCheckedOut(_) => CART_CHECKED_OUT_EVENT_TYPE,
            Self::ReminderRecorded(_) => REMINDER_RECORDED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Cart context.
#[derive(Debug, Clone)]
pub struct CartEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: CartEventKind,
}

impl DomainEvent for CartEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("CartEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
