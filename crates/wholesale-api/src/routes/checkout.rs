//! Checkout route.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use wholesale_orders::application::checkout;
use wholesale_orders::domain::address::ShippingAddress;
use wholesale_orders::domain::commands::PlaceOrder;
use wholesale_pricing::Money;

use crate::error::ApiError;
use crate::owner::OwnerContext;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Where to ship.
    pub shipping_address: ShippingAddress,
    /// Total shown to the customer. Compared, never charged.
    #[serde(default)]
    pub total: Option<Money>,
}

/// Response body for a placed order.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    /// The order identifier.
    pub order_id: Uuid,
    /// Human-facing order number.
    pub order_number: String,
    /// Server-computed amount payable.
    pub grand_total: Money,
}

/// POST /
#[instrument(skip_all, fields(owner_id = %owner_id))]
async fn place_order(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let command = PlaceOrder {
        correlation_id: Uuid::new_v4(),
        owner_id,
        shipping_address: request.shipping_address,
        client_total: request.total,
    };

    info!(correlation_id = %command.correlation_id, "handling place_order command");

    let order = checkout::handle_checkout(
        &command,
        &state.pricing,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: order.order_id,
            order_number: order.order_number,
            grand_total: order.pricing.grand_total,
        }),
    ))
}

/// Returns the router for checkout.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(place_order))
}
