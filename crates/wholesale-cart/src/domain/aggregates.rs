//! Aggregate roots for the Cart context.

use chrono::{DateTime, Utc};
use uuid::Uuid;
use wholesale_core::aggregate::AggregateRoot;
use wholesale_core::clock::Clock;
use wholesale_core::error::DomainError;
use wholesale_core::event::EventMetadata;
use wholesale_pricing::{LineItem, ProductSnapshot};

use super::events::{
    CartCheckedOut, CartCleared, CartEvent, CartEventKind, CartItemsReplaced, LineItemAdded,
    LineItemQuantityChanged, LineItemQuantityIncreased, LineItemRemoved, OrderedLine,
    ReminderRecorded,
};
use super::ids::cart_id_for;
use super::quantity_guard;
use super::reconciler::{self, Reconciliation};

/// The aggregate root for a customer's cart.
///
/// Domain methods validate, record an event, and update state
/// immediately, so several changes can be made before persisting.
#[derive(Debug)]
pub struct Cart {
    /// Aggregate identifier, derived from the owner.
    pub id: Uuid,
    /// The customer this cart belongs to.
    pub owner_id: Uuid,
    /// Persisted version (stored event count).
    pub(crate) version: i64,
    /// Lines in insertion order.
    items: Vec<LineItem>,
    /// When the last abandoned-cart reminder went out.
    last_notified_at: Option<DateTime<Utc>>,
    /// When the cart last changed.
    updated_at: Option<DateTime<Utc>>,
    /// The most recent order taken from this cart.
    last_order_id: Option<Uuid>,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<CartEvent>,
}

impl Cart {
    /// Creates the empty cart for `owner_id`.
    #[must_use]
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            id: cart_id_for(owner_id),
            owner_id,
            version: 0,
            items: Vec::new(),
            last_notified_at: None,
            updated_at: None,
            last_order_id: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Lines currently in the cart.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if nothing has ever been persisted for this cart.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.version == 0 && self.uncommitted_events.is_empty()
    }

    /// When the last reminder was recorded.
    #[must_use]
    pub fn last_notified_at(&self) -> Option<DateTime<Utc>> {
        self.last_notified_at
    }

    /// When the cart last changed.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// The most recent order taken from this cart.
    #[must_use]
    pub fn last_order_id(&self) -> Option<Uuid> {
        self.last_order_id
    }

    /// Looks up a line by identifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the line is not in this cart.
    pub fn line(&self, line_item_id: Uuid) -> Result<&LineItem, DomainError> {
        self.items
            .iter()
            .find(|item| item.line_item_id == line_item_id)
            .ok_or_else(|| DomainError::not_found("line item", line_item_id))
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: CartEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = CartEvent {
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
        self.mutate(&event);
        self.uncommitted_events.push(event);
    }

    fn mutate(&mut self, event: &CartEvent) {
        match &event.kind {
            CartEventKind::LineItemAdded(payload) => {
                self.items.push(payload.line_item.clone());
            }
            CartEventKind::LineItemQuantityIncreased(LineItemQuantityIncreased {
                line_item_id,
                quantity,
                ..
            })
            | CartEventKind::LineItemQuantityChanged(LineItemQuantityChanged {
                line_item_id,
                quantity,
                ..
            }) => {
                if let Some(item) = self
                    .items
                    .iter_mut()
                    .find(|item| item.line_item_id == *line_item_id)
                {
                    item.quantity = *quantity;
                }
            }
            CartEventKind::LineItemRemoved(payload) => {
                self.items
                    .retain(|item| item.line_item_id != payload.line_item_id);
            }
            CartEventKind::CartItemsReplaced(payload) => {
                self.items.clone_from(&payload.items);
            }
            CartEventKind::CartCleared(_) => {
                self.items.clear();
            }
            CartEventKind::CartCheckedOut(payload) => {
                for ordered in &payload.lines {
                    if let Some(item) = self
                        .items
                        .iter_mut()
                        .find(|item| item.line_item_id == ordered.line_item_id)
                    {
                        item.quantity = item.quantity.saturating_sub(ordered.quantity);
                    }
                }
                // A remainder under the minimum cannot be ordered on its own.
                self.items
                    .retain(|item| item.quantity >= item.minimum_order_quantity().max(1));
                self.last_order_id = Some(payload.order_id);
            }
            CartEventKind::ReminderRecorded(payload) => {
                self.last_notified_at = Some(payload.notified_at);
                return;
            }
        }
        self.updated_at = Some(event.metadata.occurred_at);
    }

    /// Adds a product, merging into the existing line for that product.
    ///
    /// Returns the identifier of the line that now holds the product.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationFailed` for a malformed snapshot,
    /// `DomainError::InvalidQuantity` for a non-positive quantity, and
    /// `DomainError::BelowMinimumOrderQuantity` for a new line under its
    /// minimum.
    pub fn add_item(
        &mut self,
        product: &ProductSnapshot,
        quantity: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Uuid, DomainError> {
        product.validate()?;

        match reconciler::reconcile(&self.items, product, quantity, Uuid::new_v4())? {
            Reconciliation::Merged {
                line_item_id,
                added,
                quantity,
            } => {
                self.record(
                    CartEventKind::LineItemQuantityIncreased(LineItemQuantityIncreased {
                        cart_id: self.id,
                        line_item_id,
                        added,
                        quantity,
                    }),
                    correlation_id,
                    clock,
                );
                Ok(line_item_id)
            }
            Reconciliation::Appended(line_item) => {
                let line_item_id = line_item.line_item_id;
                self.record(
                    CartEventKind::LineItemAdded(LineItemAdded {
                        cart_id: self.id,
                        line_item,
                    }),
                    correlation_id,
                    clock,
                );
                Ok(line_item_id)
            }
        }
    }

    /// Sets a line to an exact quantity. Setting the current quantity is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown line, otherwise the
    /// quantity guard's errors.
    pub fn set_quantity(
        &mut self,
        line_item_id: Uuid,
        quantity: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let item = self.line(line_item_id)?;
        let accepted = quantity_guard::validate_set(item, quantity)?;
        let previous_quantity = item.quantity;
        self.change_quantity(line_item_id, previous_quantity, accepted, correlation_id, clock);
        Ok(())
    }

    /// Changes a line's quantity by `delta`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` for an unknown line, otherwise the
    /// quantity guard's errors.
    pub fn adjust_quantity(
        &mut self,
        line_item_id: Uuid,
        delta: i64,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let item = self.line(line_item_id)?;
        let accepted = quantity_guard::validate_delta(item, delta)?;
        let previous_quantity = item.quantity;
        self.change_quantity(line_item_id, previous_quantity, accepted, correlation_id, clock);
        Ok(())
    }

    fn change_quantity(
        &mut self,
        line_item_id: Uuid,
        previous_quantity: u32,
        quantity: u32,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        if previous_quantity == quantity {
            return;
        }
        self.record(
            CartEventKind::LineItemQuantityChanged(LineItemQuantityChanged {
                cart_id: self.id,
                line_item_id,
                previous_quantity,
                quantity,
            }),
            correlation_id,
            clock,
        );
    }

    /// Removes a line.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` if the line is not in this cart.
    pub fn remove_item(
        &mut self,
        line_item_id: Uuid,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        self.line(line_item_id)?;
        self.record(
            CartEventKind::LineItemRemoved(LineItemRemoved {
                cart_id: self.id,
                line_item_id,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Replaces every line. Duplicate products in `requested` are merged,
    /// and products already in the cart keep their line identifiers.
    ///
    /// Nothing changes unless every requested line is valid.
    ///
    /// # Errors
    ///
    /// Returns the first snapshot or quantity error among `requested`.
    pub fn replace_items(
        &mut self,
        requested: &[(ProductSnapshot, i64)],
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        for (product, _) in requested {
            product.validate()?;
        }

        let current = &self.items;
        let items = reconciler::reconcile_all(
            requested.iter().map(|(product, quantity)| (product, *quantity)),
            |product_id| {
                current
                    .iter()
                    .find(|item| item.product_id() == product_id)
                    .map_or_else(Uuid::new_v4, |item| item.line_item_id)
            },
        )?;

        self.record(
            CartEventKind::CartItemsReplaced(CartItemsReplaced {
                cart_id: self.id,
                items,
            }),
            correlation_id,
            clock,
        );
        Ok(())
    }

    /// Empties the cart. Clearing an empty cart is a no-op.
    pub fn clear(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        if self.items.is_empty() {
            return;
        }
        self.record(
            CartEventKind::CartCleared(CartCleared { cart_id: self.id }),
            correlation_id,
            clock,
        );
    }

    /// Takes the quantities in `ordered` out of the cart because they
    /// became `order_id`.
    ///
    /// Lines no longer in the cart are skipped. Nothing is recorded if
    /// `order_id` was already taken or none of its lines are left.
    pub fn check_out(
        &mut self,
        order_id: Uuid,
        ordered: &[OrderedLine],
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        if self.last_order_id == Some(order_id) {
            return;
        }
        let lines: Vec<OrderedLine> = ordered
            .iter()
            .filter(|line| self.line(line.line_item_id).is_ok())
            .copied()
            .collect();
        if lines.is_empty() {
            return;
        }
        self.record(
            CartEventKind::CartCheckedOut(CartCheckedOut {
                cart_id: self.id,
                order_id,
                lines,
            }),
            correlation_id,
            clock,
        );
    }

    /// Records that an abandoned-cart reminder was sent now.
    pub fn record_reminder(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        self.record(
            CartEventKind::ReminderRecorded(ReminderRecorded {
                cart_id: self.id,
                notified_at: clock.now(),
            }),
            correlation_id,
            clock,
        );
    }
}

impl AggregateRoot for Cart {
    type Event = CartEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        self.mutate(event);
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

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use wholesale_core::event::DomainEvent;
    use wholesale_pricing::{Money, PricingPolicy, TaxRate, TaxType};
    use wholesale_test_support::FixedClock;

    use super::*;
    use crate::domain::events::{
        CART_ITEMS_REPLACED_EVENT_TYPE, LINE_ITEM_ADDED_EVENT_TYPE,
        LINE_ITEM_QUANTITY_INCREASED_EVENT_TYPE,
    };

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap())
    }

    fn product(name: &str, unit_price: i64, minimum: u32) -> ProductSnapshot {
        ProductSnapshot {
            product_id: Uuid::new_v4(),
            product_name: name.to_owned(),
            unit_price: Money::from_major(unit_price),
            minimum_order_quantity: minimum,
            tax_rate: TaxRate::ZERO,
            tax_type: TaxType::Inclusive,
            main_image_url: None,
            price_tiers: Vec::new(),
        }
    }

    #[test]
    fn test_add_item_records_line_item_added() {
        // Arrange
        let owner_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let clock = clock();
        let mut cart = Cart::new(owner_id);
        let rice = product("Rice 25kg", 1_800, 5);

        // Act
        let line_item_id = cart.add_item(&rice, 5, correlation_id, &clock).unwrap();

        // Assert
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].line_item_id, line_item_id);
        let events = cart.uncommitted_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), LINE_ITEM_ADDED_EVENT_TYPE);
        assert_eq!(events[0].metadata.sequence_number, 1);
        assert_eq!(events[0].metadata.aggregate_id, cart_id_for(owner_id));
        assert_eq!(events[0].metadata.correlation_id, correlation_id);
        assert_eq!(events[0].metadata.occurred_at, clock.0);
        assert_eq!(cart.updated_at(), Some(clock.0));
    }

    #[test]
    fn test_repeated_add_merges_into_one_line() {
        // Arrange
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let rice = product("Rice 25kg", 1_800, 5);

        // Act
        let first = cart.add_item(&rice, 5, Uuid::new_v4(), &clock).unwrap();
        let second = cart.add_item(&rice, 3, Uuid::new_v4(), &clock).unwrap();

        // Assert
        assert_eq!(first, second);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 8);
        assert_eq!(
            cart.uncommitted_events()[1].event_type(),
            LINE_ITEM_QUANTITY_INCREASED_EVENT_TYPE
        );
        assert_eq!(cart.uncommitted_events()[1].metadata.sequence_number, 2);
    }

    #[test]
    fn test_add_below_minimum_leaves_cart_unchanged() {
        let mut cart = Cart::new(Uuid::new_v4());

        let err = cart
            .add_item(&product("Oil 15L", 2_100, 10), 4, Uuid::new_v4(), &clock())
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::BelowMinimumOrderQuantity { minimum: 10, requested: 4 }
        ));
        assert!(cart.is_empty());
        assert!(cart.uncommitted_events().is_empty());
    }

    #[test]
    fn test_add_rejects_malformed_snapshot() {
        let mut cart = Cart::new(Uuid::new_v4());
        let nameless = product("", 100, 1);

        let err = cart.add_item(&nameless, 1, Uuid::new_v4(), &clock()).unwrap_err();

        assert!(matches!(err, DomainError::ValidationFailed(_)));
    }

    #[test]
    fn test_adjust_quantity_below_minimum_is_rejected() {
        // Arrange
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let line_item_id = cart
            .add_item(&product("Sugar 50kg", 2_400, 5), 5, Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        let err = cart
            .adjust_quantity(line_item_id, -1, Uuid::new_v4(), &clock)
            .unwrap_err();

        // Assert
        assert!(matches!(
            err,
            DomainError::BelowMinimumOrderQuantity { minimum: 5, requested: 4 }
        ));
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_set_quantity_to_same_value_records_nothing() {
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let line_item_id = cart
            .add_item(&product("Flour 10kg", 450, 2), 4, Uuid::new_v4(), &clock)
            .unwrap();

        cart.set_quantity(line_item_id, 4, Uuid::new_v4(), &clock).unwrap();

        assert_eq!(cart.uncommitted_events().len(), 1);
    }

    #[test]
    fn test_unknown_line_is_not_found() {
        let mut cart = Cart::new(Uuid::new_v4());
        let missing = Uuid::new_v4();

        let err = cart.remove_item(missing, Uuid::new_v4(), &clock()).unwrap_err();

        match err {
            DomainError::NotFound { resource, id } => {
                assert_eq!(resource, "line item");
                assert_eq!(id, missing.to_string());
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_remove_then_reprice() {
        // Arrange
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let rice = cart
            .add_item(&product("Rice 25kg", 1_800, 1), 2, Uuid::new_v4(), &clock)
            .unwrap();
        cart.add_item(&product("Dal 30kg", 3_000, 1), 1, Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        cart.remove_item(rice, Uuid::new_v4(), &clock).unwrap();

        // Assert
        assert_eq!(cart.items().len(), 1);
        assert_eq!(
            PricingPolicy::default().price(cart.items()).subtotal,
            Money::from_major(3_000)
        );
    }

    #[test]
    fn test_replace_items_keeps_existing_line_ids() {
        // Arrange
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let rice = product("Rice 25kg", 1_800, 1);
        let oil = product("Oil 15L", 2_100, 1);
        let rice_line = cart.add_item(&rice, 1, Uuid::new_v4(), &clock).unwrap();

        // Act
        cart.replace_items(&[(oil.clone(), 2), (rice.clone(), 3)], Uuid::new_v4(), &clock)
            .unwrap();

        // Assert
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].product_id(), oil.product_id);
        assert_eq!(cart.items()[1].line_item_id, rice_line);
        assert_eq!(cart.items()[1].quantity, 3);
        assert_eq!(
            cart.uncommitted_events()[1].event_type(),
            CART_ITEMS_REPLACED_EVENT_TYPE
        );
    }

    #[test]
    fn test_replace_items_is_all_or_nothing() {
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let rice = product("Rice 25kg", 1_800, 1);
        cart.add_item(&rice, 1, Uuid::new_v4(), &clock).unwrap();

        let result = cart.replace_items(
            &[(product("Oil 15L", 2_100, 1), 2), (product("Salt", 20, 50), 10)],
            Uuid::new_v4(),
            &clock,
        );

        assert!(result.is_err());
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].product_id(), rice.product_id);
    }

    #[test]
    fn test_clear_empty_cart_records_nothing() {
        let mut cart = Cart::new(Uuid::new_v4());

        cart.clear(Uuid::new_v4(), &clock());

        assert!(cart.is_new());
    }

    #[test]
    fn test_reminder_does_not_touch_updated_at() {
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());

        cart.record_reminder(Uuid::new_v4(), &clock);

        assert_eq!(cart.last_notified_at(), Some(clock.0));
        assert_eq!(cart.updated_at(), None);
    }

    #[test]
    fn test_apply_rebuilds_state_and_version() {
        // Arrange
        let clock = clock();
        let owner_id = Uuid::new_v4();
        let mut source = Cart::new(owner_id);
        source
            .add_item(&product("Rice 25kg", 1_800, 1), 2, Uuid::new_v4(), &clock)
            .unwrap();
        let ordered: Vec<OrderedLine> = source.items().iter().map(OrderedLine::from).collect();
        source.check_out(Uuid::new_v4(), &ordered, Uuid::new_v4(), &clock);

        // Act
        let mut replayed = Cart::new(owner_id);
        for event in source.uncommitted_events() {
            replayed.apply(event);
        }

        // Assert
        assert_eq!(replayed.version(), 2);
        assert!(replayed.is_empty());
    }

    #[test]
    fn test_check_out_takes_only_ordered_quantities() {
        // Arrange: Rice x2 was priced, then Rice grew by 3 and Oil was added.
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let rice = product("Rice 25kg", 1_800, 1);
        cart.add_item(&rice, 2, Uuid::new_v4(), &clock).unwrap();
        let ordered: Vec<OrderedLine> = cart.items().iter().map(OrderedLine::from).collect();
        cart.add_item(&rice, 3, Uuid::new_v4(), &clock).unwrap();
        let oil = cart
            .add_item(&product("Oil 15L", 2_100, 1), 1, Uuid::new_v4(), &clock)
            .unwrap();
        let order_id = Uuid::new_v4();

        // Act
        cart.check_out(order_id, &ordered, Uuid::new_v4(), &clock);

        // Assert
        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.items()[0].product_id(), rice.product_id);
        assert_eq!(cart.items()[0].quantity, 3);
        assert_eq!(cart.items()[1].line_item_id, oil);
        assert_eq!(cart.last_order_id(), Some(order_id));
    }

    #[test]
    fn test_check_out_drops_remainder_under_minimum() {
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let cement = product("Cement 50kg", 380, 10);
        cart.add_item(&cement, 10, Uuid::new_v4(), &clock).unwrap();
        let ordered: Vec<OrderedLine> = cart.items().iter().map(OrderedLine::from).collect();
        cart.add_item(&cement, 4, Uuid::new_v4(), &clock).unwrap();

        cart.check_out(Uuid::new_v4(), &ordered, Uuid::new_v4(), &clock);

        assert!(cart.is_empty());
    }

    #[test]
    fn test_check_out_of_same_order_twice_records_once() {
        let clock = clock();
        let mut cart = Cart::new(Uuid::new_v4());
        let rice = product("Rice 25kg", 1_800, 1);
        cart.add_item(&rice, 2, Uuid::new_v4(), &clock).unwrap();
        let ordered: Vec<OrderedLine> = cart.items().iter().map(OrderedLine::from).collect();
        cart.add_item(&rice, 5, Uuid::new_v4(), &clock).unwrap();
        let order_id = Uuid::new_v4();

        cart.check_out(order_id, &ordered, Uuid::new_v4(), &clock);
        cart.check_out(order_id, &ordered, Uuid::new_v4(), &clock);

        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.uncommitted_events().len(), 3);
    }
}
