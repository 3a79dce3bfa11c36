//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;
use wholesale_core::clock::Clock;
use wholesale_core::repository::EventRepository;
use wholesale_event_store::InMemoryEventRepository;
use wholesale_pricing::PricingPolicy;
use wholesale_test_support::FixedClock;

use wholesale_api::owner::OWNER_HEADER;
use wholesale_api::routes;
use wholesale_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 3, 2, 9, 30, 0).unwrap(),
    ))
}

/// Build the full app router over `event_repository` with a fixed clock.
pub fn build_test_app(event_repository: Arc<dyn EventRepository>) -> Router {
    let app_state = AppState::new(fixed_clock(), event_repository, PricingPolicy::default());
    routes::router().with_state(app_state)
}

/// Build the full app router over a fresh in-memory event store.
pub fn build_in_memory_app() -> Router {
    build_test_app(Arc::new(InMemoryEventRepository::new()))
}

/// Send a request, optionally as `owner_id` and with a JSON body, and
/// return the status and JSON response.
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    owner_id: Option<Uuid>,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(owner_id) = owner_id {
        builder = builder.header(OWNER_HEADER, owner_id.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request as `owner_id`.
pub async fn get_json(
    app: Router,
    uri: &str,
    owner_id: Option<Uuid>,
) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, owner_id, None).await
}

/// Send a POST request with a JSON body as `owner_id`.
pub async fn post_json(
    app: Router,
    uri: &str,
    owner_id: Option<Uuid>,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, owner_id, Some(body)).await
}

/// A product payload with no tax.
pub fn product(name: &str, unit_price: &str, minimum_order_quantity: u32) -> serde_json::Value {
    serde_json::json!({
        "product_id": Uuid::new_v4(),
        "product_name": name,
        "unit_price": unit_price,
        "minimum_order_quantity": minimum_order_quantity
    })
}

/// A shipping address payload that passes validation.
pub fn valid_address() -> serde_json::Value {
    serde_json::json!({
        "full_name": "Asha Traders",
        "phone": "9876543210",
        "street": "12 Market Road",
        "city": "Pune",
        "state": "Maharashtra",
        "postal_code": "411001"
    })
}
