//! Order placement, status changes and user bookkeeping.

mod common;

use common::*;
use orchard_api::handlers::order::{
    create_order, delete_order, get_order, list_orders_for_user, list_orders_grouped_by_user,
    update_order_status, CreateOrderRequest, UpdateOrderStatusRequest,
};
use orchard_api::handlers::user::{delete_user, get_user, update_user};
use orchard_api::{ApiResult, AppState, ErrorCode};
use orchard_core::{
    CurrentOrder, Order, OrderLineRequest, OrderStatus, RequestedConfiguration, UserUpdate,
};

fn request(user_id: &str, items: Vec<OrderLineRequest>) -> CreateOrderRequest {
    CreateOrderRequest {
        user_id: user_id.to_string(),
        items,
        shipping_address: None,
    }
}

async fn set_status(state: &AppState, id: &str, status: OrderStatus) -> ApiResult<Order> {
    update_order_status(state, id, &UpdateOrderStatusRequest { status }).await
}

#[tokio::test]
async fn create_order_totals_lines_and_points_user_at_it() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let phone = find_variant(&state, "iPhone 13", "Black", 60_000).await;
    let laptop = find_variant(&state, "MacBook Air", "Silver", 90_000).await;

    let order = place(&state, &buyer.id, vec![line_for(&phone, 2), line_for(&laptop, 1)]).await;

    assert_eq!(order.total_cents, 210_000);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[1].configuration.cpu.as_deref(), Some("M1"));
    assert_eq!(order.items[1].configuration.ram, Some(8));

    let stored = get_order(&state, &order.id).await.unwrap();
    assert_eq!(stored.items, order.items);

    let buyer = get_user(&state, &buyer.id).await.unwrap();
    assert_eq!(
        buyer.current_order,
        Some(CurrentOrder {
            order_id: order.id.clone(),
            status: OrderStatus::Pending,
        })
    );
}

#[tokio::test]
async fn one_bad_line_rejects_the_whole_order() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let good = find_variant(&state, "iPhone 13", "Black", 60_000).await;
    let other = find_variant(&state, "iPhone 13", "Blue", 62_000).await;

    let mut bad = line_for(&other, 1);
    bad.configuration.color = Some("Black".to_string());

    let err = create_order(&state, &request(&buyer.id, vec![line_for(&good, 1), bad]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidConfiguration);
    assert_eq!(err.status(), 400);
    assert!(err.message.contains("color"));
    assert!(list_orders_for_user(&state, &buyer.id).await.unwrap().is_empty());
    assert!(get_user(&state, &buyer.id).await.unwrap().current_order.is_none());
}

#[tokio::test]
async fn missing_configuration_field_is_a_validation_error() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 13", "Black", 60_000).await;

    let mut line = line_for(&variant, 1);
    line.configuration = RequestedConfiguration {
        condition: Some("New".to_string()),
        color: Some("Black".to_string()),
        ..Default::default()
    };

    let err = create_order(&state, &request(&buyer.id, vec![line]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValidationError);
    assert!(err.message.contains("configuration.storage"));

    let err = create_order(&state, &request(&buyer.id, vec![line_for(&variant, 0)]))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);

    let err = create_order(&state, &request(&buyer.id, Vec::new()))
        .await
        .unwrap_err();
    assert_eq!(err.message, "items is required");
}

#[tokio::test]
async fn unknown_user_or_variant_is_not_found() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 13", "Black", 60_000).await;

    let err = create_order(&state, &request("nobody", vec![line_for(&variant, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "User not found: nobody");

    let mut line = line_for(&variant, 1);
    line.variant_id = "gone".to_string();
    let err = create_order(&state, &request(&buyer.id, vec![line]))
        .await
        .unwrap_err();
    assert_eq!(err.message, "Variant not found: gone");
}

#[tokio::test]
async fn failed_pointer_write_reports_the_saved_order() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 12", "Red", 30_000).await;
    let earlier = place(&state, &buyer.id, vec![line_for(&variant, 1)]).await;
    fail_writes(&state, "users_frozen", "BEFORE UPDATE ON users").await;

    let err = create_order(&state, &request(&buyer.id, vec![line_for(&variant, 2)]))
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::OrderPointerNotUpdated);
    assert_eq!(err.status(), 500);
    assert!(err.message.contains("users_frozen"));

    // The order itself is stored and named in the error
    let orders = list_orders_for_user(&state, &buyer.id).await.unwrap();
    assert_eq!(orders.len(), 2);
    let saved = orders.iter().find(|o| o.id != earlier.id).unwrap();
    assert_eq!(saved.total_cents, 60_000);
    assert!(err.message.contains(&saved.id));

    // The pointer still targets the earlier order
    let pointer = get_user(&state, &buyer.id).await.unwrap().current_order.unwrap();
    assert_eq!(pointer.order_id, earlier.id);
    assert_eq!(pointer.status, OrderStatus::Pending);
}

#[tokio::test]
async fn failed_pointer_write_after_status_change_is_reported() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 12", "Red", 30_000).await;
    let order = place(&state, &buyer.id, vec![line_for(&variant, 1)]).await;
    fail_writes(&state, "users_frozen", "BEFORE UPDATE ON users").await;

    let err = set_status(&state, &order.id, OrderStatus::Shipped).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::OrderPointerNotUpdated);
    assert!(err.message.contains(&order.id));
    assert_eq!(get_order(&state, &order.id).await.unwrap().status, OrderStatus::Shipped);
    let pointer = get_user(&state, &buyer.id).await.unwrap().current_order.unwrap();
    assert_eq!(pointer.status, OrderStatus::Pending);
}

#[tokio::test]
async fn status_flow_ends_in_purchase_history() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPad Air", "Space Gray", 45_000).await;
    let order = place(&state, &buyer.id, vec![line_for(&variant, 1)]).await;

    let shipped = set_status(&state, &order.id, OrderStatus::Shipped).await.unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    let pointer = get_user(&state, &buyer.id).await.unwrap().current_order.unwrap();
    assert_eq!(pointer.status, OrderStatus::Shipped);

    set_status(&state, &order.id, OrderStatus::Delivered).await.unwrap();
    let buyer_after = get_user(&state, &buyer.id).await.unwrap();
    assert!(buyer_after.current_order.is_none());
    assert_eq!(buyer_after.purchase_history, vec![order.id.clone()]);

    let err = set_status(&state, &order.id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    let err = set_status(&state, "missing", OrderStatus::Shipped).await.unwrap_err();
    assert_eq!(err.status(), 404);
}

#[tokio::test]
async fn cancelling_clears_the_pointer_without_history() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 12", "Red", 30_000).await;
    let order = place(&state, &buyer.id, vec![line_for(&variant, 1)]).await;

    set_status(&state, &order.id, OrderStatus::Cancelled).await.unwrap();

    let buyer = get_user(&state, &buyer.id).await.unwrap();
    assert!(buyer.current_order.is_none());
    assert!(buyer.purchase_history.is_empty());
}

#[tokio::test]
async fn delivering_an_older_order_keeps_the_newer_pointer() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 12", "Red", 30_000).await;
    let older = place(&state, &buyer.id, vec![line_for(&variant, 1)]).await;
    let newer = place(&state, &buyer.id, vec![line_for(&variant, 2)]).await;

    set_status(&state, &older.id, OrderStatus::Delivered).await.unwrap();

    let buyer = get_user(&state, &buyer.id).await.unwrap();
    assert_eq!(buyer.current_order.unwrap().order_id, newer.id);
    assert_eq!(buyer.purchase_history, vec![older.id]);
}

#[tokio::test]
async fn orders_group_by_user_newest_first() {
    let state = state().await;
    seed_catalog(&state).await;
    let ann = user(&state, "ann@example.com").await;
    let bob = user(&state, "bob@example.com").await;
    let variant = find_variant(&state, "iPhone 12", "Red", 30_000).await;

    let ann_first = place(&state, &ann.id, vec![line_for(&variant, 1)]).await;
    let bob_only = place(&state, &bob.id, vec![line_for(&variant, 1)]).await;
    let ann_second = place(&state, &ann.id, vec![line_for(&variant, 3)]).await;

    let groups = list_orders_grouped_by_user(&state).await.unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].user.email, "ann@example.com");
    let ann_ids: Vec<&str> = groups[0].orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ann_ids, vec![ann_second.id.as_str(), ann_first.id.as_str()]);
    assert_eq!(groups[1].user.id, bob.id);
    assert_eq!(groups[1].orders[0].id, bob_only.id);

    let ann_orders = list_orders_for_user(&state, &ann.id).await.unwrap();
    assert_eq!(ann_orders[0].id, ann_second.id);
}

#[tokio::test]
async fn deleting_an_order_clears_the_pointer() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 12", "Red", 30_000).await;
    let order = place(&state, &buyer.id, vec![line_for(&variant, 1)]).await;

    let deleted = delete_order(&state, &order.id).await.unwrap();
    assert_eq!(deleted.id, order.id);

    assert!(get_user(&state, &buyer.id).await.unwrap().current_order.is_none());
    assert_eq!(get_order(&state, &order.id).await.unwrap_err().status(), 404);
    assert_eq!(delete_order(&state, &order.id).await.unwrap_err().status(), 404);
}

#[tokio::test]
async fn deleting_a_user_deletes_their_orders() {
    let state = state().await;
    seed_catalog(&state).await;
    let buyer = user(&state, "buyer@example.com").await;
    let variant = find_variant(&state, "iPhone 12", "Red", 30_000).await;
    let order = place(&state, &buyer.id, vec![line_for(&variant, 1)]).await;

    delete_user(&state, &buyer.id).await.unwrap();

    assert_eq!(get_order(&state, &order.id).await.unwrap_err().status(), 404);
    assert_eq!(list_orders_for_user(&state, &buyer.id).await.unwrap_err().status(), 404);
    assert!(list_orders_grouped_by_user(&state).await.unwrap().is_empty());
    assert_eq!(delete_user(&state, &buyer.id).await.unwrap_err().status(), 404);
}

#[tokio::test]
async fn user_profile_rules() {
    let state = state().await;
    let ann = user(&state, "ann@example.com").await;
    user(&state, "bob@example.com").await;

    let updated = update_user(
        &state,
        &ann.id,
        &UserUpdate {
            email: Some(" Ann.New@Example.com ".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.email, "ann.new@example.com");

    let err = update_user(
        &state,
        &ann.id,
        &UserUpdate {
            email: Some("BOB@example.com".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    let err = update_user(
        &state,
        &ann.id,
        &UserUpdate {
            email: Some("not-an-email".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.status(), 400);

    let rejected: Result<UserUpdate, _> =
        serde_json::from_value(serde_json::json!({ "purchase_history": [] }));
    assert!(rejected.is_err());
}
