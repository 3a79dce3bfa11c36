//! Checkout: turns the owner's cart into an immutable order.
//!
//! The order is written first and the cart is cleared afterwards. The two
//! writes are not atomic. The order id is derived from the cart id and the
//! priced cart version, so:
//!
//! - a duplicate submit of the same cart lands on the same order stream,
//!   loses the version-0 append and returns the order already placed;
//! - clearing takes out only the ordered lines and quantities, retrying
//!   against whatever the cart became, so edits made after pricing survive
//!   and nothing ordered is left to be ordered again;
//! - a cart whose clear failed is emptied the next time it is loaded,
//!   because an order already exists for its current version.

use tracing::{debug, info, warn};
use wholesale_cart::application::command_handlers::handle_check_out;
use wholesale_cart::application::store;
use wholesale_cart::domain::commands::CheckOutCart;
use wholesale_cart::domain::events::OrderedLine;
use wholesale_cart::domain::ids::checkout_order_id;
use wholesale_core::aggregate::AggregateRoot;
use wholesale_core::clock::Clock;
use wholesale_core::command::Command;
use wholesale_core::error::DomainError;
use wholesale_core::repository::EventRepository;
use wholesale_pricing::PricingPolicy;

use crate::application::command_handlers::{load_order, save};
use crate::application::query_handlers::OrderView;
use crate::domain::aggregates::{NewOrder, Order};
use crate::domain::commands::PlaceOrder;

/// Handles the `PlaceOrder` command.
///
/// Totals are always recomputed from the cart; `client_total` is only
/// compared and logged.
///
/// # Errors
///
/// Returns `DomainError::ValidationFailed` for a bad address,
/// `DomainError::EmptyCart` if the cart has no items, or a repository
/// error if the order could not be written. A failure to clear the cart
/// afterwards is logged, not returned.
pub async fn handle_checkout(
    command: &PlaceOrder,
    policy: &PricingPolicy,
    clock: &dyn Clock,
    repo: &dyn EventRepository,
) -> Result<OrderView, DomainError> {
    let shipping_address = command.shipping_address.validated()?;

    let cart = store::load_cart(command.owner_id, clock, repo).await?;
    if cart.is_empty() {
        return Err(DomainError::EmptyCart(command.owner_id));
    }

    let pricing = policy.price(cart.items());
    if let Some(client_total) = command
        .client_total
        .filter(|total| *total != pricing.grand_total)
    {
        debug!(
            owner_id = %command.owner_id,
            %client_total,
            grand_total = %pricing.grand_total,
            "ignoring client total that disagrees with server pricing"
        );
    }

    let cart_version = cart.version();
    let order_id = checkout_order_id(cart.id, cart_version);
    let mut order = Order::new(order_id);
    order.place(
        NewOrder {
            owner_id: command.owner_id,
            cart_id: cart.id,
            cart_version,
            shipping_address,
            items: cart.items().to_vec(),
            pricing,
        },
        command.correlation_id,
        clock,
    );

    match save(&mut order, repo).await {
        Ok(_) => info!(
            command = command.command_type(),
            correlation_id = %command.correlation_id,
            %order_id,
            order_number = order.order_number(),
            "order placed"
        ),
        Err(DomainError::ConcurrencyConflict { .. }) => {
            info!(
                correlation_id = %command.correlation_id,
                %order_id,
                "order already placed for this cart, returning it"
            );
            order = load_order(order_id, repo).await?;
        }
        Err(e) => return Err(e),
    }

    let check_out = CheckOutCart {
        correlation_id: command.correlation_id,
        owner_id: command.owner_id,
        cart_version,
        order_id,
        lines: order.items.iter().map(OrderedLine::from).collect(),
    };
    if let Err(e) = handle_check_out(&check_out, clock, repo).await {
        warn!(
            correlation_id = %command.correlation_id,
            cart_id = %cart.id,
            %order_id,
            error = %e,
            "order placed but cart was not cleared"
        );
    }

    Ok(OrderView::from_order(&order))
}
