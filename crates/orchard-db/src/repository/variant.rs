//! # Variant Repository
//!
//! Database operations for catalog variants.
//!
//! ## Key Operations
//! - Filtered reads for listings (SQL prefilter, then regex matching)
//! - Per-model reads feeding the option and combination views
//! - Bulk insert that keeps going past rejected rows
//! - Update/delete guarded against variants that orders reference
//!
//! ## Listing Query
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  VariantFilter                                                          │
//! │       │                                                                 │
//! │       ├── equality + price range ──► SQL WHERE (indexed)               │
//! │       │                                                                 │
//! │       └── model/color/cpu regex  ──► VariantFilter::matches in Rust    │
//! │                                      (SQLite has no REGEXP)            │
//! │                                                                         │
//! │  Rows come back in insertion order so equal-price ties stay stable.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{from_json, generate_id, to_json, IN_LIST_CHUNK};
use orchard_core::{DeviceSpec, DeviceType, NewVariant, Variant, VariantFilter};

const VARIANT_COLUMNS: &str = "id, device_type, model, price_cents, image, condition, battery, \
     color, storage, cpu, ram, connectivity, created_at, updated_at";

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct VariantRow {
    id: String,
    device_type: DeviceType,
    model: String,
    price_cents: i64,
    image: Option<String>,
    condition: String,
    battery: String,
    color: String,
    storage: String,
    cpu: Option<String>,
    ram: Option<i64>,
    connectivity: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VariantRow {
    fn into_variant(self) -> DbResult<Variant> {
        let missing = |field: &str| DbError::corrupt("variant", &self.id, format!("{} is missing", field));

        let spec = match self.device_type {
            DeviceType::Phone => DeviceSpec::Phone,
            DeviceType::Laptop => {
                let ram = self.ram.ok_or_else(|| missing("ram"))?;
                DeviceSpec::Laptop {
                    cpu: self.cpu.clone().ok_or_else(|| missing("cpu"))?,
                    ram: u32::try_from(ram).map_err(|e| DbError::corrupt("variant", &self.id, e))?,
                }
            }
            DeviceType::Tablet => DeviceSpec::Tablet {
                connectivity: self.connectivity.clone().ok_or_else(|| missing("connectivity"))?,
            },
        };
        let storage = from_json("variant", &self.id, &self.storage)?;

        Ok(Variant {
            id: self.id,
            model: self.model,
            price_cents: self.price_cents,
            image: self.image,
            condition: self.condition,
            battery: self.battery,
            color: self.color,
            storage,
            spec,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_variants(rows: Vec<VariantRow>) -> DbResult<Vec<Variant>> {
    rows.into_iter().map(VariantRow::into_variant).collect()
}

/// Inserts one variant row.
async fn insert_row<'c, E>(executor: E, variant: &Variant) -> DbResult<()>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO variants (
            id, device_type, model, price_cents, image,
            condition, battery, color, storage,
            cpu, ram, connectivity, created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
    )
    .bind(&variant.id)
    .bind(variant.device_type())
    .bind(&variant.model)
    .bind(variant.price_cents)
    .bind(&variant.image)
    .bind(&variant.condition)
    .bind(&variant.battery)
    .bind(&variant.color)
    .bind(to_json(&variant.storage)?)
    .bind(variant.cpu())
    .bind(variant.ram().map(i64::from))
    .bind(variant.connectivity())
    .bind(variant.created_at)
    .bind(variant.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Appends the SQL-expressible part of a filter to a WHERE clause.
fn push_conditions(qb: &mut QueryBuilder<'_, Sqlite>, filter: &VariantFilter) -> DbResult<()> {
    if let Some(device_type) = filter.device_type {
        qb.push(" AND device_type = ").push_bind(device_type);
    }
    if let Some(condition) = &filter.condition {
        qb.push(" AND condition = ").push_bind(condition.clone());
    }
    if let Some(battery) = &filter.battery {
        qb.push(" AND battery = ").push_bind(battery.clone());
    }
    if let Some(storage) = &filter.storage {
        qb.push(" AND storage = ").push_bind(to_json(storage)?);
    }
    if let Some(ram) = filter.ram {
        qb.push(" AND ram = ").push_bind(i64::from(ram));
    }
    if let Some(connectivity) = &filter.connectivity {
        qb.push(" AND connectivity = ").push_bind(connectivity.clone());
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price_cents >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price_cents <= ").push_bind(max);
    }
    Ok(())
}

// =============================================================================
// Batch Result
// =============================================================================

/// One rejected row of a bulk insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Position of the row in the submitted batch.
    pub index: usize,
    pub message: String,
}

/// Outcome of a continue-on-error bulk insert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub inserted: usize,
    pub failed: Vec<BatchFailure>,
}

impl BatchResult {
    /// Returns true if every row was written.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Folds another batch into this one, shifting its indexes by `offset`.
    pub fn absorb(&mut self, other: BatchResult, offset: usize) {
        self.inserted += other.inserted;
        self.failed.extend(other.failed.into_iter().map(|f| BatchFailure {
            index: f.index + offset,
            message: f.message,
        }));
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for variant database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = VariantRepository::new(pool);
///
/// let variant = repo.insert(&new_variant).await?;
/// let same_model = repo.find_by_model(&variant.model, variant.device_type()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}

impl VariantRepository {
    /// Creates a new VariantRepository.
    pub fn new(pool: SqlitePool) -> Self {
        VariantRepository { pool }
    }

    /// Inserts a validated variant, assigning its id and timestamps.
    pub async fn insert(&self, variant: &NewVariant) -> DbResult<Variant> {
        let variant = variant.clone().into_variant(generate_id(), Utc::now());
        debug!(id = %variant.id, model = %variant.model, "Inserting variant");

        insert_row(&self.pool, &variant).await?;
        Ok(variant)
    }

    /// Inserts many variants, continuing past rows the store rejects.
    ///
    /// All rows share one transaction; a rejected row only drops itself.
    pub async fn insert_many(&self, variants: &[NewVariant]) -> DbResult<BatchResult> {
        debug!(count = variants.len(), "Bulk inserting variants");

        let now = Utc::now();
        let mut result = BatchResult::default();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (index, variant) in variants.iter().enumerate() {
            let variant = variant.clone().into_variant(generate_id(), now);
            match insert_row(&mut *tx, &variant).await {
                Ok(()) => result.inserted += 1,
                Err(e) if e.is_unavailable() => return Err(e),
                Err(e) => result.failed.push(BatchFailure {
                    index,
                    message: e.to_string(),
                }),
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        if !result.is_complete() {
            warn!(
                inserted = result.inserted,
                failed = result.failed.len(),
                "Bulk insert partially failed"
            );
        }

        Ok(result)
    }

    /// Gets a variant by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Variant>> {
        let row: Option<VariantRow> =
            sqlx::query_as(&format!("SELECT {} FROM variants WHERE id = ?1", VARIANT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(VariantRow::into_variant).transpose()
    }

    /// Gets every variant whose id is in `ids`. Unknown ids are skipped.
    pub async fn find_by_ids(&self, ids: &[String]) -> DbResult<Vec<Variant>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut variants = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(IN_LIST_CHUNK) {
            let mut qb = QueryBuilder::<Sqlite>::new(format!(
                "SELECT {} FROM variants WHERE id IN (",
                VARIANT_COLUMNS
            ));
            let mut separated = qb.separated(", ");
            for id in chunk {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(") ORDER BY rowid");

            let rows: Vec<VariantRow> = qb.build_query_as().fetch_all(&self.pool).await?;
            variants.extend(into_variants(rows)?);
        }

        Ok(variants)
    }

    /// Gets every variant of one model and device type.
    pub async fn find_by_model(&self, model: &str, device_type: DeviceType) -> DbResult<Vec<Variant>> {
        debug!(model = %model, device_type = %device_type, "Fetching model variants");

        let rows: Vec<VariantRow> = sqlx::query_as(&format!(
            "SELECT {} FROM variants WHERE model = ?1 AND device_type = ?2 ORDER BY rowid",
            VARIANT_COLUMNS
        ))
        .bind(model)
        .bind(device_type)
        .fetch_all(&self.pool)
        .await?;

        into_variants(rows)
    }

    /// Gets every variant in insertion order.
    pub async fn list_all(&self) -> DbResult<Vec<Variant>> {
        let rows: Vec<VariantRow> =
            sqlx::query_as(&format!("SELECT {} FROM variants ORDER BY rowid", VARIANT_COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        into_variants(rows)
    }

    /// Gets every variant matching `filter`, in insertion order.
    pub async fn find(&self, filter: &VariantFilter) -> DbResult<Vec<Variant>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {} FROM variants WHERE 1 = 1",
            VARIANT_COLUMNS
        ));
        push_conditions(&mut qb, filter)?;
        qb.push(" ORDER BY rowid");

        let rows: Vec<VariantRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let candidates = rows.len();
        let variants: Vec<Variant> = into_variants(rows)?
            .into_iter()
            .filter(|v| filter.matches(v))
            .collect();

        debug!(candidates, matched = variants.len(), "Filtered variants");
        Ok(variants)
    }

    /// Counts the variants matching `filter`.
    pub async fn count(&self, filter: &VariantFilter) -> DbResult<usize> {
        let needs_regex = filter.model.is_some() || filter.color.is_some() || filter.cpu.is_some();
        if needs_regex {
            return Ok(self.find(filter).await?.len());
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM variants WHERE 1 = 1");
        push_conditions(&mut qb, filter)?;
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok(count as usize)
    }

    /// Counts all variants.
    pub async fn count_all(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM variants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Returns true if any order line references the variant.
    pub async fn is_referenced(&self, id: &str) -> DbResult<bool> {
        let lines: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM order_items WHERE variant_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(lines > 0)
    }

    /// Replaces a variant's fields.
    ///
    /// ## Returns
    /// * `Err(DbError::Conflict)` - An order line references the variant
    /// * `Err(DbError::NotFound)` - Variant doesn't exist
    pub async fn update(&self, id: &str, fields: &NewVariant) -> DbResult<Variant> {
        debug!(id = %id, "Updating variant");

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Variant", id))?;
        if self.is_referenced(id).await? {
            return Err(DbError::Conflict(format!(
                "variant {} is referenced by placed orders",
                id
            )));
        }

        let mut updated = fields.clone().into_variant(existing.id, existing.created_at);
        updated.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE variants SET
                device_type = ?2, model = ?3, price_cents = ?4, image = ?5,
                condition = ?6, battery = ?7, color = ?8, storage = ?9,
                cpu = ?10, ram = ?11, connectivity = ?12, updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(&updated.id)
        .bind(updated.device_type())
        .bind(&updated.model)
        .bind(updated.price_cents)
        .bind(&updated.image)
        .bind(&updated.condition)
        .bind(&updated.battery)
        .bind(&updated.color)
        .bind(to_json(&updated.storage)?)
        .bind(updated.cpu())
        .bind(updated.ram().map(i64::from))
        .bind(updated.connectivity())
        .bind(updated.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Deletes a variant.
    ///
    /// ## Returns
    /// * `Err(DbError::Conflict)` - An order line references the variant
    /// * `Err(DbError::NotFound)` - Variant doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting variant");

        if self.is_referenced(id).await? {
            return Err(DbError::Conflict(format!(
                "variant {} is referenced by placed orders",
                id
            )));
        }

        let result = sqlx::query("DELETE FROM variants WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Variant", id));
        }

        Ok(())
    }

    /// Deletes every variant no order line references. Returns the count.
    pub async fn delete_unreferenced(&self) -> DbResult<u64> {
        let result = sqlx::query(
            "DELETE FROM variants WHERE id NOT IN (SELECT variant_id FROM order_items)",
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
