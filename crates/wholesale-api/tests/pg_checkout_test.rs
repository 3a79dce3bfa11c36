//! Checkout against the `PostgreSQL` event store.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use sqlx::PgPool;
use uuid::Uuid;
use wholesale_event_store::PgEventRepository;

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires a PostgreSQL DATABASE_URL"]
async fn test_checkout_round_trip(pool: PgPool) {
    let owner_id = Uuid::new_v4();
    let app = common::build_test_app(Arc::new(PgEventRepository::new(pool)));

    let (status, _) = common::post_json(
        app.clone(),
        "/api/v1/cart/items",
        Some(owner_id),
        &serde_json::json!({
            "product": common::product("Rice 25kg", "1800", 1),
            "quantity": 3
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, placed) = common::post_json(
        app.clone(),
        "/api/v1/checkout",
        Some(owner_id),
        &serde_json::json!({ "shipping_address": common::valid_address() }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["grand_total"], "5400.00");

    let (status, cart) = common::get_json(app, "/api/v1/cart", Some(owner_id)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(cart["items"].as_array().unwrap().is_empty());
}
