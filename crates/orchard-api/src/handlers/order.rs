//! # Order Operations
//!
//! Order placement, status changes and order reads.
//!
//! ## Placement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_order                                         │
//! │                                                                         │
//! │  1. user exists?                         no  → 404 User                │
//! │  2. fetch every referenced variant                                     │
//! │  3. build_order: check every line        any → 400, nothing written    │
//! │  4. orders().insert  (order + lines, one transaction)                  │
//! │  5. users().set_current_order            fails → 500                   │
//! │                                          ORDER_POINTER_NOT_UPDATED     │
//! │                                          naming the saved order id     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Status Changes
//! ```text
//! pending ──► processing ──► shipped ──► delivered   (history += id, pointer cleared)
//!    │            │             │
//!    └────────────┴─────────────┴──────► cancelled   (pointer cleared)
//!
//! delivered and cancelled accept no further change. The status write comes
//! first; a failed pointer write after it is ORDER_POINTER_NOT_UPDATED.
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::elapsed_ms;
use crate::error::{ApiError, ApiResult};
use crate::AppState;
use orchard_core::validation::validate_required_text;
use orchard_core::{
    build_order, plan_status_change, Address, Order, OrderLineRequest, OrderStatus, PointerUpdate,
    Variant,
};

// =============================================================================
// DTOs
// =============================================================================

/// Body of [`create_order`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(alias = "userId")]
    pub user_id: String,
    pub items: Vec<OrderLineRequest>,
    #[serde(default, alias = "shippingAddress")]
    pub shipping_address: Option<Address>,
}

/// Body of [`update_order_status`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// The public face of a user next to their orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// One user's orders, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOrders {
    pub user: UserSummary,
    pub orders: Vec<Order>,
}

// =============================================================================
// Operations
// =============================================================================

/// Places an order.
///
/// Every line is checked against its variant before anything is written;
/// one bad line rejects the whole order. The order and its lines are
/// written together, then the user's current order is pointed at it.
pub async fn create_order(state: &AppState, request: &CreateOrderRequest) -> ApiResult<Order> {
    let start = Instant::now();
    let user_id = validate_required_text("user_id", Some(request.user_id.as_str()))?;

    if state.db.users().get_by_id(&user_id).await?.is_none() {
        return Err(ApiError::not_found("User", &user_id));
    }

    let ids: Vec<String> = request.items.iter().map(|i| i.variant_id.clone()).collect();
    let variants = state.db.variants().find_by_ids(&ids).await?;
    let by_id: HashMap<&str, &Variant> = variants.iter().map(|v| (v.id.as_str(), v)).collect();

    let draft = build_order(&request.items, |id| by_id.get(id).copied())?;

    let now = Utc::now();
    let order = Order {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.clone(),
        items: draft.items,
        status: OrderStatus::Pending,
        total_cents: draft.total.cents(),
        shipping_address: request.shipping_address.clone(),
        created_at: now,
        updated_at: now,
    };

    state.db.orders().insert(&order).await?;

    if let Err(e) = state
        .db
        .users()
        .set_current_order(&user_id, &order.id, order.status)
        .await
    {
        let cause = ApiError::from(e);
        error!(order_id = %order.id, user_id = %user_id, error = %cause, "Order saved without pointer");
        return Err(ApiError::order_pointer_not_updated(&order.id, &cause));
    }

    info!(
        elapsed_ms = elapsed_ms(start),
        order_id = %order.id,
        items = order.items.len(),
        total_cents = order.total_cents,
        "create_order complete"
    );

    Ok(order)
}

/// Gets an order by ID.
pub async fn get_order(state: &AppState, id: &str) -> ApiResult<Order> {
    debug!(id = %id, "get_order");

    state
        .db
        .orders()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))
}

/// Lists a user's orders, newest first.
pub async fn list_orders_for_user(state: &AppState, user_id: &str) -> ApiResult<Vec<Order>> {
    let start = Instant::now();

    if state.db.users().get_by_id(user_id).await?.is_none() {
        return Err(ApiError::not_found("User", user_id));
    }
    let orders = state.db.orders().list_by_user(user_id).await?;

    info!(
        elapsed_ms = elapsed_ms(start),
        user_id = %user_id,
        count = orders.len(),
        "list_orders_for_user complete"
    );

    Ok(orders)
}

/// Lists every order grouped by user.
///
/// Groups appear in the order of each user's newest order, and orders within
/// a group are newest first.
pub async fn list_orders_grouped_by_user(state: &AppState) -> ApiResult<Vec<UserOrders>> {
    let start = Instant::now();

    let orders = state.db.orders().list_all().await?;
    let order_count = orders.len();

    let mut user_ids: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<Order>> = HashMap::new();
    for order in orders {
        if !grouped.contains_key(&order.user_id) {
            user_ids.push(order.user_id.clone());
        }
        grouped.entry(order.user_id.clone()).or_default().push(order);
    }

    let users = state.db.users().find_by_ids(&user_ids).await?;
    let mut summaries: HashMap<String, UserSummary> = users
        .into_iter()
        .map(|u| {
            (
                u.id.clone(),
                UserSummary {
                    id: u.id,
                    name: u.name,
                    email: u.email,
                },
            )
        })
        .collect();

    // Orders cascade with their user, so every group has a summary
    let groups: Vec<UserOrders> = user_ids
        .into_iter()
        .filter_map(|id| {
            let user = summaries.remove(&id)?;
            let orders = grouped.remove(&id)?;
            Some(UserOrders { user, orders })
        })
        .collect();

    info!(
        elapsed_ms = elapsed_ms(start),
        users = groups.len(),
        orders = order_count,
        "list_orders_grouped_by_user complete"
    );

    Ok(groups)
}

/// Moves an order to `request.status` and updates the owner's pointers.
///
/// Delivered appends the order to purchase history and clears the pointer;
/// cancelled clears the pointer; any other status is mirrored on it. If
/// that user write fails after the status is saved, the error is
/// `ORDER_POINTER_NOT_UPDATED`.
pub async fn update_order_status(
    state: &AppState,
    id: &str,
    request: &UpdateOrderStatusRequest,
) -> ApiResult<Order> {
    let start = Instant::now();

    let current = state
        .db
        .orders()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))?;
    let effect = plan_status_change(&current, request.status)?;

    let order = state.db.orders().update_status(id, request.status).await?;

    let users = state.db.users();
    let followup = match effect {
        PointerUpdate::Refresh(status) => users.refresh_pointer(&order.id, status).await.map(|_| ()),
        PointerUpdate::MoveToHistory => users.complete_order(&order.user_id, &order.id).await,
        PointerUpdate::Clear => users.clear_pointer_to(&order.id).await.map(|_| ()),
    };
    if let Err(e) = followup {
        let cause = ApiError::from(e);
        error!(order_id = %order.id, status = %order.status, error = %cause, "Status saved without pointer");
        return Err(ApiError::order_pointer_not_updated(&order.id, &cause));
    }

    info!(
        elapsed_ms = elapsed_ms(start),
        order_id = %order.id,
        from = %current.status,
        to = %order.status,
        "update_order_status complete"
    );

    Ok(order)
}

/// Deletes an order and clears any user pointer to it.
///
/// Returns the deleted order.
pub async fn delete_order(state: &AppState, id: &str) -> ApiResult<Order> {
    let order = state.db.orders().delete(id).await?;
    info!(order_id = %order.id, user_id = %order.user_id, "delete_order complete");
    Ok(order)
}
