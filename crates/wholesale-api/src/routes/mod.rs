//! Route modules.

pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;

use axum::Router;

use crate::state::AppState;

/// Returns every route of the service, without middleware or state.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/cart", cart::router())
        .nest("/api/v1/checkout", checkout::router())
        .nest("/api/v1/orders", orders::router())
}
