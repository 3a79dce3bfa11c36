//! Command handlers for the Cart context.
//!
//! Each handler loads the owner's cart, runs one domain operation and
//! appends the resulting events at the loaded version. A concurrent write
//! to the same cart surfaces as `DomainError::ConcurrencyConflict`; the
//! handler then reloads and re-applies the operation, so two requests can
//! never silently overwrite each other. Checkout clearing goes through the
//! same loop, so an edit racing the clear never leaves ordered lines behind.

use tracing::{debug, warn};
use uuid::Uuid;
use wholesale_core::clock::Clock;
use wholesale_core::command::Command;
use wholesale_core::error::DomainError;
use wholesale_core::repository::{EventRepository, StoredEvent};

use crate::application::store;
use crate::domain::aggregates::Cart;
use crate::domain::commands::{
    AddItem, AdjustQuantity, CheckOutCart, ClearCart, RecordReminder, RemoveItem, ReplaceItems,
    SetQuantity,
};

/// Attempts made before a persistent conflict is returned to the caller.
pub const MAX_COMMAND_ATTEMPTS: u32 = 3;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct CartCommandResult {
    /// The cart affected by the command.
    pub aggregate_id: Uuid,
    /// The stored events produced and persisted.
    pub stored_events: Vec<StoredEvent>,
    /// The cart after the command.
    pub cart: Cart,
}

/// How a handler loads the cart before applying its operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Loading {
    /// Settle leftovers of an interrupted checkout first.
    Settled,
    /// Use the stream exactly as stored.
    Raw,
}

async fn execute<C, F>(
    command: &C,
    owner_id: Uuid,
    loading: Loading,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
    mut operation: F,
) -> Result<CartCommandResult, DomainError>
where
    C: Command,
    F: FnMut(&mut Cart) -> Result<(), DomainError> + Send,
{
    let mut attempt = 1;
    loop {
        let mut cart = match loading {
            Loading::Settled => store::load_cart(owner_id, clock, repo).await?,
            Loading::Raw => store::load_raw(owner_id, repo).await?,
        };
        operation(&mut cart)?;

        match store::save(&mut cart, repo).await {
            Ok(stored_events) => {
                debug!(
                    command = command.command_type(),
                    correlation_id = %command.correlation_id(),
                    cart_id = %cart.id,
                    events = stored_events.len(),
                    "cart command applied"
                );
                return Ok(CartCommandResult {
                    aggregate_id: cart.id,
                    stored_events,
                    cart,
                });
            }
            Err(DomainError::ConcurrencyConflict { .. }) if attempt < MAX_COMMAND_ATTEMPTS => {
                warn!(
                    command = command.command_type(),
                    correlation_id = %command.correlation_id(),
                    cart_id = %cart.id,
                    attempt,
                    "cart changed concurrently, retrying"
                );
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Handles the `AddItem` command: merges the product into the cart.
///
/// # Errors
///
/// Returns the guard or validation error for a bad request, or a
/// repository error.
pub async fn handle_add_item(
    command: &AddItem,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    execute(command, command.owner_id, Loading::Settled, clock, repo, |cart| {
        cart.add_item(&command.product, command.quantity, command.correlation_id, clock)
            .map(|_| ())
    })
    .await
}

/// Handles the `SetQuantity` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown line, the guard's errors
/// for a bad quantity, or a repository error.
pub async fn handle_set_quantity(
    command: &SetQuantity,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    execute(command, command.owner_id, Loading::Settled, clock, repo, |cart| {
        cart.set_quantity(
            command.line_item_id,
            command.quantity,
            command.correlation_id,
            clock,
        )
    })
    .await
}

/// Handles the `AdjustQuantity` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown line, the guard's errors
/// for a bad resulting quantity, or a repository error.
pub async fn handle_adjust_quantity(
    command: &AdjustQuantity,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    execute(command, command.owner_id, Loading::Settled, clock, repo, |cart| {
        cart.adjust_quantity(
            command.line_item_id,
            command.delta,
            command.correlation_id,
            clock,
        )
    })
    .await
}

/// Handles the `RemoveItem` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` for an unknown line, or a repository
/// error.
pub async fn handle_remove_item(
    command: &RemoveItem,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    execute(command, command.owner_id, Loading::Settled, clock, repo, |cart| {
        cart.remove_item(command.line_item_id, command.correlation_id, clock)
    })
    .await
}

/// Handles the `ReplaceItems` command.
///
/// # Errors
///
/// Returns the first validation or guard error among the requested lines,
/// or a repository error.
pub async fn handle_replace_items(
    command: &ReplaceItems,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    let requested: Vec<_> = command
        .items
        .iter()
        .map(|line| (line.product.clone(), line.quantity))
        .collect();
    execute(command, command.owner_id, Loading::Settled, clock, repo, |cart| {
        cart.replace_items(&requested, command.correlation_id, clock)
    })
    .await
}

/// Handles the `ClearCart` command.
///
/// # Errors
///
/// Returns `DomainError` if loading or appending fails.
pub async fn handle_clear_cart(
    command: &ClearCart,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    execute(command, command.owner_id, Loading::Settled, clock, repo, |cart| {
        cart.clear(command.correlation_id, clock);
        Ok(())
    })
    .await
}

/// Handles the `RecordReminder` command.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the owner never had a cart, or a
/// repository error.
pub async fn handle_record_reminder(
    command: &RecordReminder,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    execute(command, command.owner_id, Loading::Settled, clock, repo, |cart| {
        if cart.is_new() {
            return Err(DomainError::not_found("cart", command.owner_id));
        }
        cart.record_reminder(command.correlation_id, clock);
        Ok(())
    })
    .await
}

/// Handles the `CheckOutCart` command: takes the ordered lines out of the
/// cart that became `order_id`.
///
/// The cart may have moved since it was priced. Only the ordered
/// quantities are removed, so lines added afterwards stay. Running the
/// command again for the same order changes nothing.
///
/// # Errors
///
/// Returns `DomainError::ConcurrencyConflict` if the cart kept changing
/// for `MAX_COMMAND_ATTEMPTS` attempts, or a repository error.
pub async fn handle_check_out(
    command: &CheckOutCart,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<CartCommandResult, DomainError> {
    execute(command, command.owner_id, Loading::Raw, clock, repo, |cart| {
        if cart.version != command.cart_version {
            debug!(
                correlation_id = %command.correlation_id,
                order_id = %command.order_id,
                priced_version = command.cart_version,
                version = cart.version,
                "cart changed after pricing, taking only the ordered lines"
            );
        }
        cart.check_out(
            command.order_id,
            &command.lines,
            command.correlation_id,
            clock,
        );
        Ok(())
    })
    .await
}
