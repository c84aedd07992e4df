//! Shared fixtures for the operation tests.

#![allow(dead_code)]

use orchard_api::handlers::order::{create_order, CreateOrderRequest};
use orchard_api::handlers::user::create_user;
use orchard_api::handlers::variant::bulk_insert_variants;
use orchard_api::{ApiConfig, AppState};
use orchard_core::validation::BulkVariants;
use orchard_core::{
    DimensionValue, NewUser, Order, OrderLineRequest, RequestedConfiguration, User, Variant,
};
use orchard_db::{Database, DbConfig};
use serde_json::{json, Value};

pub async fn state() -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppState::new(db, ApiConfig::default())
}

pub fn phone(model: &str, storage: u32, color: &str, price_cents: i64) -> Value {
    json!({
        "model": model,
        "price_cents": price_cents,
        "condition": "New",
        "battery": 100,
        "color": color,
        "storage": storage,
    })
}

pub fn laptop(model: &str, cpu: &str, ram: u32, price_cents: i64) -> Value {
    json!({
        "model": model,
        "price_cents": price_cents,
        "condition": "Used",
        "battery": "90",
        "color": "Silver",
        "storage": 256,
        "cpu": cpu,
        "ram": ram,
    })
}

pub fn tablet(model: &str, connectivity: &str, price_cents: i64) -> Value {
    json!({
        "model": model,
        "price_cents": price_cents,
        "condition": "New",
        "battery": "100",
        "color": "Space Gray",
        "storage": "64GB",
        "connectivity": connectivity,
    })
}

/// Loads a grouped catalog payload through the bulk operation.
pub async fn seed(state: &AppState, payload: Value) {
    let request: BulkVariants = serde_json::from_value(payload).unwrap();
    let response = bulk_insert_variants(state, &request).await.unwrap();
    assert_eq!(response.failed_count, 0, "{}", response.message);
}

/// The catalog used by most tests: two phone models, a laptop model with
/// two CPUs and one tablet.
pub async fn seed_catalog(state: &AppState) {
    seed(
        state,
        json!({
            "phones": [
                phone("iPhone 13", 128, "Black", 50_000),
                phone("iPhone 13", 256, "Black", 60_000),
                phone("iPhone 13", 256, "Blue", 62_000),
                phone("iPhone 12", 64, "Red", 30_000),
            ],
            "laptops": [
                laptop("MacBook Air", "M1", 8, 90_000),
                laptop("MacBook Air", "M2", 16, 120_000),
            ],
            "tablets": [
                tablet("iPad Air", "WiFi", 45_000),
            ],
        }),
    )
    .await;
}

pub async fn find_variant(state: &AppState, model: &str, color: &str, price_cents: i64) -> Variant {
    state
        .db
        .variants()
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .find(|v| v.model == model && v.color == color && v.price_cents == price_cents)
        .unwrap()
}

pub async fn user(state: &AppState, email: &str) -> User {
    create_user(
        state,
        &NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            phone: None,
            address: None,
        },
    )
    .await
    .unwrap()
}

/// An order line that repeats the variant's own configuration.
pub fn line_for(variant: &Variant, quantity: i64) -> OrderLineRequest {
    OrderLineRequest {
        variant_id: variant.id.clone(),
        configuration: RequestedConfiguration {
            condition: Some(variant.condition.clone()),
            storage: Some(variant.storage.clone()),
            color: Some(variant.color.clone()),
            ..Default::default()
        },
        quantity,
        price_at_purchase_cents: variant.price_cents,
    }
}

pub fn storage(value: u32) -> DimensionValue {
    DimensionValue::from(value)
}

pub async fn place(state: &AppState, user_id: &str, lines: Vec<OrderLineRequest>) -> Order {
    create_order(
        state,
        &CreateOrderRequest {
            user_id: user_id.to_string(),
            items: lines,
            shipping_address: None,
        },
    )
    .await
    .unwrap()
}

/// Installs a trigger that aborts matching writes with `name` as the error,
/// so a test can make the store fail part way through an operation.
pub async fn fail_writes(state: &AppState, name: &str, when: &str) {
    let sql = format!("CREATE TRIGGER {name} {when} BEGIN SELECT RAISE(ABORT, '{name}'); END");
    sqlx::query(&sql).execute(state.db.pool()).await.unwrap();
}
