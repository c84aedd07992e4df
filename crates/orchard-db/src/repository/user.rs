//! # User Repository
//!
//! Database operations for customers.
//!
//! ## Order Pointers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  users.current_order_id / current_order_status                         │
//! │       │                                                                 │
//! │       ├── set_current_order()    ← after an order is placed            │
//! │       ├── refresh_pointer()      ← order moved to a non-final status   │
//! │       ├── complete_order()       ← delivered: history += id, clear     │
//! │       └── clear_pointer_to()     ← cancelled or deleted                │
//! │                                                                         │
//! │  purchase_history rows keep delivery order (seq).                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{from_json, generate_id, to_json_opt, IN_LIST_CHUNK};
use orchard_core::{Address, CurrentOrder, NewUser, OrderStatus, User, UserUpdate};

const USER_COLUMNS: &str = "id, name, email, phone, address, current_order_id, \
     current_order_status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    current_order_id: Option<String>,
    current_order_status: Option<OrderStatus>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, purchase_history: Vec<String>) -> DbResult<User> {
        let address: Option<Address> = self
            .address
            .as_deref()
            .map(|text| from_json("user", &self.id, text))
            .transpose()?;

        let current_order = match (self.current_order_id, self.current_order_status) {
            (Some(order_id), Some(status)) => Some(CurrentOrder { order_id, status }),
            (None, None) => None,
            _ => {
                return Err(DbError::corrupt(
                    "user",
                    &self.id,
                    "current order id and status disagree",
                ))
            }
        };

        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address,
            purchase_history,
            current_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Maps a unique-email violation to a message naming the address.
fn email_taken(err: DbError, email: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("email", email),
        other => other,
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Creates a user from already validated fields.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn create(&self, user: &NewUser) -> DbResult<User> {
        let now = Utc::now();
        let created = User {
            id: generate_id(),
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            address: user.address.clone(),
            purchase_history: Vec::new(),
            current_order: None,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %created.id, "Creating user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, phone, address, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&created.id)
        .bind(&created.name)
        .bind(&created.email)
        .bind(&created.phone)
        .bind(to_json_opt(created.address.as_ref())?)
        .bind(created.created_at)
        .bind(created.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| email_taken(e.into(), &created.email))?;

        Ok(created)
    }

    /// Gets a user by ID, with purchase history.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => {
                let history = self.purchase_history(id).await?;
                row.into_user(history).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Gets every user whose id is in `ids`. Unknown ids are skipped.
    ///
    /// Purchase history is not loaded.
    pub async fn find_by_ids(&self, ids: &[String]) -> DbResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut users = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new(format!(
                "SELECT {} FROM users WHERE id IN (",
                USER_COLUMNS
            ));
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(")");

            let rows: Vec<UserRow> = qb.build_query_as().fetch_all(&self.pool).await?;
            for row in rows {
                users.push(row.into_user(Vec::new())?);
            }
        }

        Ok(users)
    }

    /// Delivered order ids, oldest delivery first.
    pub async fn purchase_history(&self, user_id: &str) -> DbResult<Vec<String>> {
        let ids: Vec<String> =
            sqlx::query_scalar("SELECT order_id FROM purchase_history WHERE user_id = ?1 ORDER BY seq")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids)
    }

    /// Applies a profile update. Absent fields are left unchanged.
    pub async fn update_profile(&self, id: &str, update: &UserUpdate) -> DbResult<User> {
        debug!(id = %id, "Updating user profile");

        let mut user = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))?;

        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        if update.phone.is_some() {
            user.phone = update.phone.clone();
        }
        if update.address.is_some() {
            user.address = update.address.clone();
        }
        user.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE users
            SET name = ?2, email = ?3, phone = ?4, address = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(to_json_opt(user.address.as_ref())?)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| email_taken(e.into(), &user.email))?;

        Ok(user)
    }

    /// Deletes a user. Their orders and history go with them.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }

    /// Points the user at the order now in flight.
    pub async fn set_current_order(
        &self,
        user_id: &str,
        order_id: &str,
        status: OrderStatus,
    ) -> DbResult<()> {
        debug!(user_id = %user_id, order_id = %order_id, "Setting current order");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET current_order_id = ?2, current_order_status = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(user_id)
        .bind(order_id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_id));
        }

        Ok(())
    }

    /// Updates the status on every pointer to `order_id`. Returns the count.
    pub async fn refresh_pointer(&self, order_id: &str, status: OrderStatus) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET current_order_status = ?2, updated_at = ?3
            WHERE current_order_id = ?1
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Clears every pointer to `order_id`. Returns the count.
    pub async fn clear_pointer_to(&self, order_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET current_order_id = NULL, current_order_status = NULL, updated_at = ?2
            WHERE current_order_id = ?1
            "#,
        )
        .bind(order_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Records a delivery: appends to history and clears the pointer if it
    /// still targets this order, in one transaction.
    pub async fn complete_order(&self, user_id: &str, order_id: &str) -> DbResult<()> {
        debug!(user_id = %user_id, order_id = %order_id, "Completing order");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query("INSERT OR IGNORE INTO purchase_history (user_id, order_id) VALUES (?1, ?2)")
            .bind(user_id)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE users
            SET current_order_id = NULL, current_order_status = NULL, updated_at = ?3
            WHERE id = ?1 AND current_order_id = ?2
            "#,
        )
        .bind(user_id)
        .bind(order_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
