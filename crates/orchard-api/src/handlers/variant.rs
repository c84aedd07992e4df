//! # Variant Operations
//!
//! Catalog listing, the per-model option and combination views, the
//! lowest-price catalog and bulk loading.
//!
//! ## Option Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Shopper opens "iPhone 13" and picks storage = 256                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  get_options({ model, device_type, storage: 256 })                     │
//! │       │                                                                 │
//! │       ├── find_by_model(model, device_type)   every stocked SKU        │
//! │       │                                                                 │
//! │       └── aggregate_options(.., filter)       colors, conditions, ...  │
//! │                                               still available at 256   │
//! │       ▼                                                                 │
//! │  OptionSet { color: [...], price: { min, max } }                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::elapsed_ms;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::AppState;
use orchard_core::validation::{validate_bulk, validate_variant_input, BulkVariants};
use orchard_core::{
    aggregate_options, enumerate_combinations, select_lowest_price, Combination, DeviceType,
    OptionFilter, OptionSet, Page, Pagination, ValidationError, Variant, VariantFilter,
    VariantInput, VariantQuery, BULK_BATCH_SIZE,
};
use orchard_db::BatchResult;

// =============================================================================
// DTOs
// =============================================================================

/// Query of [`list_variants`].
pub type ListVariantsQuery = VariantQuery;

/// One page of a variant listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantPage {
    pub items: Vec<Variant>,
    /// Items on this page.
    pub count: usize,
    /// Matches across all pages.
    pub total: usize,
    pub page: u32,
    pub pages: u32,
    pub limit: u32,
}

impl From<Page<Variant>> for VariantPage {
    fn from(page: Page<Variant>) -> Self {
        VariantPage {
            count: page.count(),
            total: page.total,
            page: page.page,
            pages: page.pages,
            limit: page.limit,
            items: page.items,
        }
    }
}

/// A variant with the option set of its model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantDetail {
    pub variant: Variant,
    pub options: OptionSet,
}

/// Query of [`get_options`]: a model plus the values already chosen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsQuery {
    pub model: Option<String>,
    #[serde(alias = "type")]
    pub device_type: Option<DeviceType>,
    #[serde(flatten)]
    pub selected: OptionFilter,
}

/// Query of [`get_combinations`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CombinationsQuery {
    pub model: Option<String>,
    #[serde(alias = "type")]
    pub device_type: Option<DeviceType>,
}

/// Stocked combinations of a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationsResponse {
    pub count: usize,
    pub combinations: Vec<Combination>,
}

/// Lowest-price variants, one per model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowestPriceResponse {
    /// Number of distinct models.
    pub count: usize,
    pub all: Vec<Variant>,
    pub by_device_type: LowestPriceBuckets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowestPriceBuckets {
    pub phones: Vec<Variant>,
    pub laptops: Vec<Variant>,
    pub tablets: Vec<Variant>,
}

/// Body of [`bulk_insert_variants`].
pub type BulkInsertRequest = BulkVariants;

/// One rejected item of a bulk insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    /// Position in the request, phones first, then laptops, then tablets.
    pub index: usize,
    pub message: String,
}

/// Outcome of a bulk insert. Partial success is not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkInsertResponse {
    pub inserted_count: usize,
    pub failed_count: usize,
    pub message: String,
    /// Up to the configured sample of failures.
    pub failures: Vec<BulkFailure>,
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolves the (model, device_type) pair a per-model view needs.
fn require_model(
    model: Option<&str>,
    device_type: Option<DeviceType>,
) -> Result<(String, DeviceType), ValidationError> {
    let model = model
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ValidationError::required("model"))?;
    let device_type = device_type.ok_or_else(|| ValidationError::required("device_type"))?;
    Ok((model.to_string(), device_type))
}

// =============================================================================
// Operations
// =============================================================================

/// Lists variants matching `query`, one page at a time.
///
/// `model`, `color` and `cpu` are case-insensitive patterns; the other
/// dimensions match exactly; `min_price`/`max_price` bound the price in
/// cents. Results keep insertion order.
pub async fn list_variants(state: &AppState, query: &ListVariantsQuery) -> ApiResult<VariantPage> {
    let start = Instant::now();
    let filter = VariantFilter::from_query(query)?;
    let pagination = Pagination::resolve(
        query.page,
        query.limit,
        state.config.default_page_limit,
        state.config.max_page_limit,
    );

    let matches = state.db.variants().find(&filter).await?;
    let page = VariantPage::from(Page::paginate(matches, pagination));

    info!(
        elapsed_ms = elapsed_ms(start),
        count = page.count,
        total = page.total,
        page = page.page,
        "list_variants complete"
    );

    Ok(page)
}

/// Gets a variant and the option set of its model.
pub async fn get_variant(state: &AppState, id: &str) -> ApiResult<VariantDetail> {
    debug!(id = %id, "get_variant");

    let variant = state
        .db
        .variants()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Variant", id))?;

    let siblings = state
        .db
        .variants()
        .find_by_model(&variant.model, variant.device_type())
        .await?;
    let options = aggregate_options(
        &variant.model,
        variant.device_type(),
        &siblings,
        &OptionFilter::default(),
    );

    Ok(VariantDetail { variant, options })
}

/// Builds the option set of a model, narrowed by the values already chosen.
///
/// A request without a model or device type names nothing to look up and
/// is answered with NotFound.
pub async fn get_options(state: &AppState, query: &OptionsQuery) -> ApiResult<OptionSet> {
    let start = Instant::now();
    let (model, device_type) = require_model(query.model.as_deref(), query.device_type)
        .map_err(|e| ApiError::new(ErrorCode::NotFound, e.to_string()))?;

    let variants = state.db.variants().find_by_model(&model, device_type).await?;
    let options = aggregate_options(&model, device_type, &variants, &query.selected);

    info!(
        elapsed_ms = elapsed_ms(start),
        model = %model,
        device_type = %device_type,
        variants = variants.len(),
        empty = options.is_empty(),
        "get_options complete"
    );

    Ok(options)
}

/// Enumerates the distinct stocked combinations of a model.
pub async fn get_combinations(
    state: &AppState,
    query: &CombinationsQuery,
) -> ApiResult<CombinationsResponse> {
    let start = Instant::now();
    let (model, device_type) = require_model(query.model.as_deref(), query.device_type)?;

    let variants = state.db.variants().find_by_model(&model, device_type).await?;
    let set = enumerate_combinations(device_type, &variants);

    info!(
        elapsed_ms = elapsed_ms(start),
        model = %model,
        count = set.len(),
        "get_combinations complete"
    );

    Ok(CombinationsResponse {
        count: set.len(),
        combinations: set.combinations,
    })
}

/// Picks the cheapest variant of every model.
pub async fn get_lowest_price_per_model(state: &AppState) -> ApiResult<LowestPriceResponse> {
    let start = Instant::now();

    let variants = state.db.variants().list_all().await?;
    let scanned = variants.len();
    let catalog = select_lowest_price(variants);

    info!(
        elapsed_ms = elapsed_ms(start),
        scanned,
        models = catalog.len(),
        "get_lowest_price_per_model complete"
    );

    Ok(LowestPriceResponse {
        count: catalog.len(),
        all: catalog.all,
        by_device_type: LowestPriceBuckets {
            phones: catalog.phones,
            laptops: catalog.laptops,
            tablets: catalog.tablets,
        },
    })
}

/// Validates and stores a grouped batch of variants.
///
/// Any invalid item rejects the whole request before anything is written.
/// Rows the store then rejects are skipped and reported.
pub async fn bulk_insert_variants(
    state: &AppState,
    request: &BulkInsertRequest,
) -> ApiResult<BulkInsertResponse> {
    let start = Instant::now();
    let variants = validate_bulk(request)?;

    let mut result = BatchResult::default();
    for (batch_index, batch) in variants.chunks(BULK_BATCH_SIZE).enumerate() {
        let batch_result = state.db.variants().insert_many(batch).await?;
        result.absorb(batch_result, batch_index * BULK_BATCH_SIZE);
    }

    let failed_count = result.failed.len();
    if failed_count > 0 {
        warn!(
            inserted = result.inserted,
            failed = failed_count,
            "bulk_insert_variants partially failed"
        );
    }

    let message = if failed_count == 0 {
        format!("Inserted {} variants", result.inserted)
    } else {
        format!(
            "Inserted {} of {} variants; {} failed",
            result.inserted,
            variants.len(),
            failed_count
        )
    };

    info!(
        elapsed_ms = elapsed_ms(start),
        inserted = result.inserted,
        failed = failed_count,
        "bulk_insert_variants complete"
    );

    Ok(BulkInsertResponse {
        inserted_count: result.inserted,
        failed_count,
        message,
        failures: result
            .failed
            .into_iter()
            .take(state.config.bulk_error_sample)
            .map(|f| BulkFailure {
                index: f.index,
                message: f.message,
            })
            .collect(),
    })
}

/// Replaces a variant's fields.
///
/// The device type defaults to the stored one. Variants that orders
/// reference cannot change.
pub async fn update_variant(state: &AppState, id: &str, input: &VariantInput) -> ApiResult<Variant> {
    let existing = state
        .db
        .variants()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Variant", id))?;

    let device_type = input.device_type.unwrap_or_else(|| existing.device_type());
    let fields = validate_variant_input(input, device_type)?;
    let updated = state.db.variants().update(id, &fields).await?;

    info!(id = %id, model = %updated.model, "update_variant complete");
    Ok(updated)
}

/// Deletes a variant no order references.
pub async fn delete_variant(state: &AppState, id: &str) -> ApiResult<()> {
    state.db.variants().delete(id).await?;
    info!(id = %id, "delete_variant complete");
    Ok(())
}
