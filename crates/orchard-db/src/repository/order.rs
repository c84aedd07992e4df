//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Write Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert(order)                                                          │
//! │    BEGIN                                                                │
//! │      INSERT orders        (1 row)                                      │
//! │      INSERT order_items   (1 row per line, position = line index)      │
//! │    COMMIT                 ← no order without its lines                 │
//! │                                                                         │
//! │  delete(id)                                                             │
//! │    BEGIN                                                                │
//! │      clear users.current_order_id pointing here                        │
//! │      DELETE orders        (lines and history rows cascade)             │
//! │    COMMIT                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{from_json, to_json, to_json_opt, IN_LIST_CHUNK};
use orchard_core::{Address, Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str =
    "id, user_id, status, total_cents, shipping_address, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    status: OrderStatus,
    total_cents: i64,
    shipping_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> DbResult<Order> {
        let shipping_address: Option<Address> = self
            .shipping_address
            .as_deref()
            .map(|text| from_json("order", &self.id, text))
            .transpose()?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            items,
            status: self.status,
            total_cents: self.total_cents,
            shipping_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    order_id: String,
    variant_id: String,
    configuration: String,
    quantity: i64,
    price_at_purchase_cents: i64,
}

impl ItemRow {
    fn into_item(self) -> DbResult<OrderItem> {
        Ok(OrderItem {
            configuration: from_json("order", &self.order_id, &self.configuration)?,
            variant_id: self.variant_id,
            quantity: self.quantity,
            price_at_purchase_cents: self.price_at_purchase_cents,
        })
    }
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Writes an order and all of its lines in one transaction.
    ///
    /// ## Returns
    /// * `Err(DbError::ForeignKeyViolation)` - Unknown user or variant
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, user_id = %order.user_id, items = order.items.len(), "Inserting order");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, status, total_cents, shipping_address, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(order.status)
        .bind(order.total_cents)
        .bind(to_json_opt(order.shipping_address.as_ref())?)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, variant_id, configuration,
                    quantity, price_at_purchase_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&order.id)
            .bind(position as i64)
            .bind(&item.variant_id)
            .bind(to_json(&item.configuration)?)
            .bind(item.quantity)
            .bind(item.price_at_purchase_cents)
            .execute(&mut *tx)
            .await?;
        }

        // Dropping an uncommitted transaction rolls it back
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Gets an order by ID, with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => {
                let mut orders = self.with_items(vec![row]).await?;
                Ok(orders.pop())
            }
            None => Ok(None),
        }
    }

    /// Gets a user's orders, newest first.
    pub async fn list_by_user(&self, user_id: &str) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders WHERE user_id = ?1 ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(rows).await
    }

    /// Gets every order, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC, rowid DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_items(rows).await
    }

    /// Sets an order's status and returns the updated order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - No such order
    /// * `Err(DbError::Conflict)` - The order is already delivered or cancelled
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> DbResult<Order> {
        debug!(id = %id, status = %status, "Updating order status");

        // The terminal check is part of the write so racing updates cannot
        // both move a finished order
        let result = sqlx::query(
            r#"
            UPDATE orders SET status = ?2, updated_at = ?3
            WHERE id = ?1 AND status NOT IN ('delivered', 'cancelled')
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await? {
                Some(order) => Err(DbError::Conflict(format!(
                    "order {} is already {}",
                    id, order.status
                ))),
                None => Err(DbError::not_found("Order", id)),
            };
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))
    }

    /// Deletes an order and clears any user pointer to it.
    ///
    /// Returns the deleted order.
    pub async fn delete(&self, id: &str) -> DbResult<Order> {
        debug!(id = %id, "Deleting order");

        let order = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Zero rows here just means nobody pointed at the order
        sqlx::query(
            r#"
            UPDATE users
            SET current_order_id = NULL, current_order_status = NULL
            WHERE current_order_id = ?1
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(order)
    }

    /// Loads the lines for `rows` and assembles orders, keeping row order.
    async fn with_items(&self, rows: Vec<OrderRow>) -> DbResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut items: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for chunk in rows.chunks(IN_LIST_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new(
                "SELECT order_id, variant_id, configuration, quantity, price_at_purchase_cents \
                 FROM order_items WHERE order_id IN (",
            );
            let mut separated = qb.separated(", ");
            for row in chunk {
                separated.push_bind(row.id.clone());
            }
            separated.push_unseparated(") ORDER BY order_id, position");

            let item_rows: Vec<ItemRow> = qb.build_query_as().fetch_all(&self.pool).await?;
            for item_row in item_rows {
                let order_id = item_row.order_id.clone();
                items.entry(order_id).or_default().push(item_row.into_item()?);
            }
        }

        rows.into_iter()
            .map(|row| {
                let lines = items.remove(&row.id).unwrap_or_default();
                row.into_order(lines)
            })
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
