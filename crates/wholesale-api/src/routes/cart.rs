//! Routes for the owner's cart.

use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;
use wholesale_cart::application::command_handlers::{self, CartCommandResult};
use wholesale_cart::application::query_handlers::{self, CartView};
use wholesale_cart::domain::commands;
use wholesale_pricing::{PricingPolicy, ProductSnapshot};

use crate::error::ApiError;
use crate::owner::OwnerContext;
use crate::state::AppState;

/// Request body for POST /items.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    /// Catalog fields to snapshot into the line.
    pub product: ProductSnapshot,
    /// Requested quantity.
    pub quantity: i64,
}

/// One line of a PUT /items body.
#[derive(Debug, Deserialize)]
pub struct RequestedLineBody {
    /// Catalog fields to snapshot into the line.
    pub product: ProductSnapshot,
    /// Requested quantity.
    pub quantity: i64,
}

/// Request body for PUT /items.
#[derive(Debug, Deserialize)]
pub struct ReplaceItemsRequest {
    /// The new cart contents.
    pub items: Vec<RequestedLineBody>,
}

/// Request body for PUT /items/{line_item_id}/quantity.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    /// New quantity.
    pub quantity: i64,
}

/// Request body for POST /items/{line_item_id}/adjust.
#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    /// Signed change to apply.
    pub delta: i64,
}

/// Response body returned after a cart command is handled.
#[derive(Debug, Serialize)]
pub struct CartCommandResponse {
    /// IDs of the domain events produced and persisted.
    pub event_ids: Vec<Uuid>,
    /// The cart after the command.
    pub cart: CartView,
}

impl CartCommandResponse {
    fn new(result: &CartCommandResult, pricing: &PricingPolicy) -> Self {
        Self {
            event_ids: result.stored_events.iter().map(|e| e.event_id).collect(),
            cart: CartView::from_cart(&result.cart, pricing),
        }
    }
}

/// GET /
#[instrument(skip_all, fields(owner_id = %owner_id))]
async fn get_cart(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
) -> Result<Json<CartView>, ApiError> {
    let view = query_handlers::get_cart(
        owner_id,
        &state.pricing,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(view))
}

/// DELETE /
#[instrument(skip_all, fields(owner_id = %owner_id))]
async fn clear_cart(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::ClearCart {
        correlation_id: Uuid::new_v4(),
        owner_id,
    };

    info!(correlation_id = %command.correlation_id, "handling clear_cart command");

    let result = command_handlers::handle_clear_cart(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CartCommandResponse::new(&result, &state.pricing)))
}

/// POST /items
#[instrument(skip_all, fields(owner_id = %owner_id, product_id = %request.product.product_id))]
async fn add_item(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::AddItem {
        correlation_id: Uuid::new_v4(),
        owner_id,
        product: request.product,
        quantity: request.quantity,
    };

    info!(correlation_id = %command.correlation_id, "handling add_item command");

    let result = command_handlers::handle_add_item(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CartCommandResponse::new(&result, &state.pricing)))
}

/// PUT /items
#[instrument(skip_all, fields(owner_id = %owner_id, lines = request.items.len()))]
async fn replace_items(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
    Json(request): Json<ReplaceItemsRequest>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::ReplaceItems {
        correlation_id: Uuid::new_v4(),
        owner_id,
        items: request
            .items
            .into_iter()
            .map(|line| commands::RequestedLine {
                product: line.product,
                quantity: line.quantity,
            })
            .collect(),
    };

    info!(correlation_id = %command.correlation_id, "handling replace_items command");

    let result = command_handlers::handle_replace_items(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CartCommandResponse::new(&result, &state.pricing)))
}

/// DELETE /items/{line_item_id}
#[instrument(skip_all, fields(owner_id = %owner_id, line_item_id = %line_item_id))]
async fn remove_item(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
    Path(line_item_id): Path<Uuid>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::RemoveItem {
        correlation_id: Uuid::new_v4(),
        owner_id,
        line_item_id,
    };

    info!(correlation_id = %command.correlation_id, "handling remove_item command");

    let result = command_handlers::handle_remove_item(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CartCommandResponse::new(&result, &state.pricing)))
}

/// PUT /items/{line_item_id}/quantity
#[instrument(skip_all, fields(owner_id = %owner_id, line_item_id = %line_item_id))]
async fn set_quantity(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
    Path(line_item_id): Path<Uuid>,
    Json(request): Json<SetQuantityRequest>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::SetQuantity {
        correlation_id: Uuid::new_v4(),
        owner_id,
        line_item_id,
        quantity: request.quantity,
    };

    info!(correlation_id = %command.correlation_id, "handling set_quantity command");

    let result = command_handlers::handle_set_quantity(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CartCommandResponse::new(&result, &state.pricing)))
}

/// POST /items/{line_item_id}/adjust
#[instrument(skip_all, fields(owner_id = %owner_id, line_item_id = %line_item_id))]
async fn adjust_quantity(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
    Path(line_item_id): Path<Uuid>,
    Json(request): Json<AdjustQuantityRequest>,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::AdjustQuantity {
        correlation_id: Uuid::new_v4(),
        owner_id,
        line_item_id,
        delta: request.delta,
    };

    info!(correlation_id = %command.correlation_id, "handling adjust_quantity command");

    let result = command_handlers::handle_adjust_quantity(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CartCommandResponse::new(&result, &state.pricing)))
}

/// POST /reminders
#[instrument(skip_all, fields(owner_id = %owner_id))]
async fn record_reminder(
    State(state): State<AppState>,
    OwnerContext(owner_id): OwnerContext,
) -> Result<Json<CartCommandResponse>, ApiError> {
    let command = commands::RecordReminder {
        correlation_id: Uuid::new_v4(),
        owner_id,
    };

    info!(correlation_id = %command.correlation_id, "handling record_reminder command");

    let result = command_handlers::handle_record_reminder(
        &command,
        state.clock.as_ref(),
        &*state.event_repository,
    )
    .await?;

    Ok(Json(CartCommandResponse::new(&result, &state.pricing)))
}

/// Returns the router for the cart.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cart).delete(clear_cart))
        .route("/items", post(add_item).put(replace_items))
        .route("/items/{line_item_id}", delete(remove_item))
        .route("/items/{line_item_id}/quantity", put(set_quantity))
        .route("/items/{line_item_id}/adjust", post(adjust_quantity))
        .route("/reminders", post(record_reminder))
}
