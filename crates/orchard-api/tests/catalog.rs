//! Catalog reads, option views and bulk loading against an in-memory store.

mod common;

use common::*;
use orchard_api::handlers::order::{create_order, CreateOrderRequest};
use orchard_api::handlers::variant::{
    bulk_insert_variants, delete_variant, get_combinations, get_lowest_price_per_model,
    get_options, get_variant, list_variants, update_variant, CombinationsQuery, OptionsQuery,
};
use orchard_api::ErrorCode;
use orchard_core::validation::BulkVariants;
use orchard_core::{
    DeviceType, DimensionValue, LineConfiguration, Money, OptionFilter, PriceRange, VariantInput,
    VariantQuery,
};
use serde_json::json;

fn options_query(model: &str, device_type: DeviceType) -> OptionsQuery {
    OptionsQuery {
        model: Some(model.to_string()),
        device_type: Some(device_type),
        selected: OptionFilter::default(),
    }
}

#[tokio::test]
async fn options_cover_every_stocked_value() {
    let state = state().await;
    seed_catalog(&state).await;

    let options = get_options(&state, &options_query("iPhone 13", DeviceType::Phone))
        .await
        .unwrap();

    assert_eq!(options.storage, vec![storage(128), storage(256)]);
    assert_eq!(options.color, vec!["Black".to_string(), "Blue".to_string()]);
    assert_eq!(options.condition, vec!["New".to_string()]);
    assert_eq!(options.cpu, None);
    assert_eq!(
        options.price,
        Some(PriceRange {
            min: Money::from_cents(50_000),
            max: Money::from_cents(62_000),
        })
    );
}

#[tokio::test]
async fn options_narrow_with_the_selection() {
    let state = state().await;
    seed_catalog(&state).await;

    let mut query = options_query("iPhone 13", DeviceType::Phone);
    query.selected.storage = Some(storage(256));
    let options = get_options(&state, &query).await.unwrap();

    assert_eq!(options.storage, vec![storage(256)]);
    assert_eq!(options.color, vec!["Black".to_string(), "Blue".to_string()]);
    assert_eq!(options.price.unwrap().min, Money::from_cents(60_000));

    let mut query = options_query("iPhone 13", DeviceType::Phone);
    query.selected.color = Some("Red".to_string());
    let options = get_options(&state, &query).await.unwrap();
    assert!(options.is_empty());
    assert!(options.storage.is_empty());
}

#[tokio::test]
async fn laptop_options_carry_cpu_and_ram() {
    let state = state().await;
    seed_catalog(&state).await;

    let options = get_options(&state, &options_query("MacBook Air", DeviceType::Laptop))
        .await
        .unwrap();

    assert_eq!(options.cpu, Some(vec!["M1".to_string(), "M2".to_string()]));
    assert_eq!(options.ram, Some(vec![8, 16]));
    assert_eq!(options.connectivity, None);

    let json = serde_json::to_value(&options).unwrap();
    assert!(json.get("connectivity").is_none());
}

#[tokio::test]
async fn options_without_model_are_not_found() {
    let state = state().await;

    let err = get_options(
        &state,
        &OptionsQuery {
            model: None,
            device_type: Some(DeviceType::Phone),
            selected: OptionFilter::default(),
        },
    )
    .await
    .unwrap_err();

    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn combinations_are_distinct_tuples() {
    let state = state().await;
    seed_catalog(&state).await;
    // Same tuple as an existing SKU at another price
    seed(&state, json!({ "phones": [phone("iPhone 13", 256, "Blue", 61_000)] })).await;

    let response = get_combinations(
        &state,
        &CombinationsQuery {
            model: Some("iPhone 13".to_string()),
            device_type: Some(DeviceType::Phone),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.count, 3);
    assert_eq!(response.combinations.len(), 3);

    let err = get_combinations(
        &state,
        &CombinationsQuery {
            model: Some("iPhone 13".to_string()),
            device_type: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.message, "device_type is required");
}

#[tokio::test]
async fn lowest_price_picks_one_variant_per_model() {
    let state = state().await;
    seed_catalog(&state).await;

    let response = get_lowest_price_per_model(&state).await.unwrap();

    let models: Vec<&str> = response.all.iter().map(|v| v.model.as_str()).collect();
    assert_eq!(models, vec!["iPhone 12", "iPhone 13", "MacBook Air", "iPad Air"]);
    assert_eq!(response.count, 4);
    assert_eq!(response.by_device_type.phones.len(), 2);
    assert_eq!(response.by_device_type.laptops[0].price_cents, 90_000);
    assert_eq!(response.by_device_type.tablets[0].model, "iPad Air");
}

#[tokio::test]
async fn list_variants_filters_and_paginates() {
    let state = state().await;
    seed_catalog(&state).await;

    let page = list_variants(
        &state,
        &VariantQuery {
            model: Some("IPHONE".to_string()),
            limit: Some(3),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total, 4);
    assert_eq!(page.count, 3);
    assert_eq!(page.pages, 2);

    let second = list_variants(
        &state,
        &VariantQuery {
            model: Some("iphone".to_string()),
            limit: Some(3),
            page: Some(2),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(second.count, 1);
    assert_eq!(second.items[0].model, "iPhone 12");

    let priced = list_variants(
        &state,
        &VariantQuery {
            device_type: Some("phone".to_string()),
            min_price: Some(55_000),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(priced.total, 2);
    assert_eq!(priced.limit, 10);

    let err = list_variants(
        &state,
        &VariantQuery {
            min_price: Some(10),
            max_price: Some(5),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
}

#[tokio::test]
async fn get_variant_includes_model_options() {
    let state = state().await;
    seed_catalog(&state).await;
    let variant = find_variant(&state, "iPhone 13", "Blue", 62_000).await;

    let detail = get_variant(&state, &variant.id).await.unwrap();

    assert_eq!(detail.variant.id, variant.id);
    assert_eq!(detail.options.color.len(), 2);
    assert_eq!(get_variant(&state, "missing").await.unwrap_err().status(), 404);
}

#[tokio::test]
async fn bulk_insert_rejects_the_whole_batch_on_invalid_item() {
    let state = state().await;
    let request: BulkVariants = serde_json::from_value(json!({
        "phones": [phone("iPhone 13", 128, "Black", 50_000)],
        "laptops": [{ "model": "MacBook Air", "price_cents": 90000, "condition": "New",
                      "battery": "100", "color": "Silver", "storage": 256, "ram": 8 }],
    }))
    .unwrap();

    let err = bulk_insert_variants(&state, &request).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::ValidationError);
    assert_eq!(err.message, "item 1: cpu is required");
    assert_eq!(state.db.variants().count_all().await.unwrap(), 0);

    let empty = bulk_insert_variants(&state, &BulkVariants::default())
        .await
        .unwrap_err();
    assert_eq!(empty.message, "products is required");
}

#[tokio::test]
async fn bulk_insert_reports_rows_the_store_rejects() {
    let state = state().await;
    fail_writes(
        &state,
        "no_iphone_x",
        "BEFORE INSERT ON variants WHEN NEW.model = 'iPhone X'",
    )
    .await;
    let request: BulkVariants = serde_json::from_value(json!({
        "phones": [
            phone("iPhone 13", 128, "Black", 50_000),
            phone("iPhone X", 64, "Black", 20_000),
            phone("iPhone 12", 64, "Red", 30_000),
        ],
    }))
    .unwrap();

    let response = bulk_insert_variants(&state, &request).await.unwrap();

    assert_eq!(response.inserted_count, 2);
    assert_eq!(response.failed_count, 1);
    assert_eq!(response.message, "Inserted 2 of 3 variants; 1 failed");
    assert_eq!(response.failures.len(), 1);
    assert_eq!(response.failures[0].index, 1);
    assert!(response.failures[0].message.contains("no_iphone_x"));
    assert_eq!(state.db.variants().count_all().await.unwrap(), 2);
}

#[tokio::test]
async fn bulk_insert_accepts_legacy_bucket_names() {
    let state = state().await;
    let request: BulkVariants = serde_json::from_value(json!({
        "iPhones": [phone("iPhone 13", 128, "Black", 50_000)],
        "MacBooks": [{ "model": "MacBook Pro", "price": 1299.99, "condition": "New",
                       "battery": "100", "color": "Space Gray", "storage": 512,
                       "cpu": "M3", "ram": 18 }],
        "iPads": [tablet("iPad Air", "Cellular", 55_000)],
    }))
    .unwrap();

    let response = bulk_insert_variants(&state, &request).await.unwrap();

    assert_eq!(response.inserted_count, 3);
    assert_eq!(response.failed_count, 0);
    assert!(response.failures.is_empty());

    let tablet = find_variant(&state, "iPad Air", "Space Gray", 55_000).await;
    assert_eq!(tablet.storage, DimensionValue::from("64GB"));
    assert_eq!(tablet.connectivity(), Some("Cellular"));

    // Legacy prices are dollars
    let laptop = find_variant(&state, "MacBook Pro", "Space Gray", 129_999).await;
    assert_eq!(laptop.cpu(), Some("M3"));
}

#[tokio::test]
async fn ordered_variants_cannot_change() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let ordered = find_variant(&state, "iPhone 13", "Black", 60_000).await;
    let untouched = find_variant(&state, "iPhone 12", "Red", 30_000).await;

    create_order(
        &state,
        &CreateOrderRequest {
            user_id: buyer.id.clone(),
            items: vec![line_for(&ordered, 1)],
            shipping_address: None,
        },
    )
    .await
    .unwrap();

    let input: VariantInput = serde_json::from_value(phone("iPhone 13", 256, "Black", 1)).unwrap();
    let err = update_variant(&state, &ordered.id, &input).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);
    assert_eq!(delete_variant(&state, &ordered.id).await.unwrap_err().status(), 409);

    let input: VariantInput = serde_json::from_value(phone("iPhone 12", 64, "Red", 25_000)).unwrap();
    let updated = update_variant(&state, &untouched.id, &input).await.unwrap();
    assert_eq!(updated.price_cents, 25_000);
    delete_variant(&state, &untouched.id).await.unwrap();
    assert_eq!(delete_variant(&state, &untouched.id).await.unwrap_err().status(), 404);

    // The snapshot survives as bought
    let orders = state.db.orders().list_by_user(&buyer.id).await.unwrap();
    assert_eq!(
        orders[0].items[0].configuration,
        LineConfiguration {
            condition: "New".to_string(),
            storage: storage(256),
            color: "Black".to_string(),
            cpu: None,
            ram: None,
            connectivity: None,
        }
    );
}
