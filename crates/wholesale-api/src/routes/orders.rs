//! Admin routes for placed orders.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;
use wholesale_orders::application::command_handlers;
use wholesale_orders::application::query_handlers::{self, OrderFilter, OrderPage, OrderView};
use wholesale_orders::domain::commands::ChangeOrderStatus;
use wholesale_orders::domain::status::OrderStatus;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /{order_id}/status.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    /// Requested status.
    pub status: OrderStatus,
}

/// GET /
#[instrument(skip(state))]
async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<OrderPage>, ApiError> {
    let page = query_handlers::list_orders(&filter, &*state.event_repository).await?;
    Ok(Json(page))
}

/// GET /{order_id}
#[instrument(skip(state))]
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderView>, ApiError> {
    let view = query_handlers::get_order(order_id, &*state.event_repository).await?;
    Ok(Json(view))
}

/// POST /{order_id}/status
#[instrument(skip(state, request), fields(status = %request.status))]
async fn change_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<ChangeStatusRequest>,
) -> Result<Json<OrderView>, ApiError> {
    let command = ChangeOrderStatus {
        correlation_id: Uuid::new_v4(),
        order_id,
        status: request.status,
    };

    info!(correlation_id = %command.correlation_id, "handling change_order_status command");

    let result = command_handlers::handle_change_status(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(OrderView::from_order(&result.order)))
}

/// Returns the router for order administration.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{order_id}", get(get_order))
        .route("/{order_id}/status", post(change_status))
}
