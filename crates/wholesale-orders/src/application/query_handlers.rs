//! Query handlers for the Orders context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wholesale_core::aggregate::AggregateRoot;
use wholesale_core::error::DomainError;
use wholesale_core::repository::EventRepository;
use wholesale_pricing::{LineItem, PriceBreakdown};

use crate::application::command_handlers::load_order;
use crate::domain::address::ShippingAddress;
use crate::domain::aggregates::{Order, StatusChange};
use crate::domain::events::ORDER_PLACED_EVENT_TYPE;
use crate::domain::status::OrderStatus;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: u32 = 100;

/// Read-only view of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderView {
    /// The order identifier.
    pub order_id: Uuid,
    /// Human-facing order number.
    pub order_number: String,
    /// The customer who placed the order.
    pub owner_id: Uuid,
    /// The cart the order came from.
    pub cart_id: Uuid,
    /// Current status.
    pub status: OrderStatus,
    /// Every status entered, oldest first.
    pub status_history: Vec<StatusChange>,
    /// Validated shipping address.
    pub shipping_address: ShippingAddress,
    /// Lines as they were at checkout.
    pub items: Vec<LineItem>,
    /// Totals computed at checkout.
    pub pricing: PriceBreakdown,
    /// When the order was placed.
    pub placed_at: DateTime<Utc>,
    /// Current version (event count).
    pub version: i64,
}

impl OrderView {
    /// Builds the view of a placed order.
    #[must_use]
    pub fn from_order(order: &Order) -> Self {
        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            owner_id: order.owner_id,
            cart_id: order.cart_id,
            status: order.status,
            status_history: order.status_history.clone(),
            shipping_address: order.shipping_address.clone(),
            items: order.items.clone(),
            pricing: order.pricing.clone(),
            placed_at: order.placed_at.unwrap_or_default(),
            version: order.version(),
        }
    }
}

/// Filters for the admin order listing. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderFilter {
    /// Only orders currently in this status.
    pub status: Option<OrderStatus>,
    /// Only orders placed by this customer.
    pub owner_id: Option<Uuid>,
    /// Only orders placed at or after this instant.
    pub placed_from: Option<DateTime<Utc>>,
    /// Only orders placed at or before this instant.
    pub placed_to: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: Option<u32>,
    /// Orders per page.
    pub per_page: Option<u32>,
}

impl OrderFilter {
    fn matches(&self, view: &OrderView) -> bool {
        self.status.is_none_or(|status| view.status == status)
            && self.owner_id.is_none_or(|owner_id| view.owner_id == owner_id)
            && self.placed_from.is_none_or(|from| view.placed_at >= from)
            && self.placed_to.is_none_or(|to| view.placed_at <= to)
    }

    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

/// One page of the admin order listing.
#[derive(Debug, Serialize)]
pub struct OrderPage {
    /// Orders on this page, newest first.
    pub orders: Vec<OrderView>,
    /// 1-based page number.
    pub page: u32,
    /// Page size used.
    pub per_page: u32,
    /// Orders matching the filter across all pages.
    pub total: usize,
}

/// Retrieves a placed order by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if no order exists with this id.
pub async fn get_order(
    order_id: Uuid,
    repo: &dyn EventRepository,
) -> Result<OrderView, DomainError> {
    let order = load_order(order_id, repo).await?;
    Ok(OrderView::from_order(&order))
}

/// Lists placed orders matching `filter`, newest first.
///
/// # Errors
///
/// Returns `DomainError` if loading or deserialization fails.
pub async fn list_orders(
    filter: &OrderFilter,
    repo: &dyn EventRepository,
) -> Result<OrderPage, DomainError> {
    let order_ids = repo.list_aggregate_ids(ORDER_PLACED_EVENT_TYPE).await?;

    let mut matching = Vec::new();
    for order_id in order_ids {
        let view = OrderView::from_order(&load_order(order_id, repo).await?);
        if filter.matches(&view) {
            matching.push(view);
        }
    }
    matching.sort_by(|a, b| {
        b.placed_at
            .cmp(&a.placed_at)
            .then_with(|| b.order_number.cmp(&a.order_number))
    });

    let page = filter.page();
    let per_page = filter.per_page();
    let total = matching.len();
    let orders = matching
        .into_iter()
        .skip((page as usize - 1).saturating_mul(per_page as usize))
        .take(per_page as usize)
        .collect();

    Ok(OrderPage {
        orders,
        page,
        per_page,
        total,
    })
}
