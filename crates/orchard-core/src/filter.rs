//! # Variant Filters and Pagination
//!
//! Turns a catalog listing query into a compiled [`VariantFilter`] and
//! slices results into pages.
//!
//! ## Matching Rules
//! ```text
//! ┌──────────────┬─────────────────────────────────────────────────────────┐
//! │ Field        │ Rule                                                    │
//! ├──────────────┼─────────────────────────────────────────────────────────┤
//! │ model        │ case-insensitive regex, partial match                   │
//! │ color        │ case-insensitive regex, partial match                   │
//! │ cpu          │ case-insensitive regex, partial match (laptops only)    │
//! │ device_type  │ equality                                                │
//! │ condition    │ equality                                                │
//! │ battery      │ equality                                                │
//! │ storage      │ equality on the canonical value ("256" == 256)          │
//! │ ram          │ equality (laptops only)                                 │
//! │ connectivity │ equality (tablets only)                                 │
//! │ price        │ min_price <= price <= max_price                         │
//! └──────────────┴─────────────────────────────────────────────────────────┘
//! ```

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::dimension::DimensionValue;
use crate::error::ValidationError;
use crate::types::{DeviceType, Variant};
use crate::validation::{validate_price_cents, ValidationResult};

// =============================================================================
// Query
// =============================================================================

/// Raw listing query, as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub device_type: Option<String>,
    pub model: Option<String>,
    pub condition: Option<String>,
    pub battery: Option<String>,
    pub color: Option<String>,
    pub storage: Option<String>,
    pub ram: Option<u32>,
    pub cpu: Option<String>,
    pub connectivity: Option<String>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<i64>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<i64>,
}

// =============================================================================
// Compiled Filter
// =============================================================================

/// A compiled variant filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct VariantFilter {
    pub device_type: Option<DeviceType>,
    pub model: Option<Regex>,
    pub condition: Option<String>,
    pub battery: Option<String>,
    pub color: Option<Regex>,
    pub storage: Option<DimensionValue>,
    pub ram: Option<u32>,
    pub cpu: Option<Regex>,
    pub connectivity: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
}

fn pattern(field: &str, value: &str) -> ValidationResult<Regex> {
    RegexBuilder::new(value)
        .case_insensitive(true)
        .build()
        .map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl VariantFilter {
    /// Compiles a listing query. Blank values are treated as absent.
    ///
    /// ## Example
    /// ```rust
    /// use orchard_core::filter::{VariantFilter, VariantQuery};
    ///
    /// let query = VariantQuery {
    ///     model: Some("pro".to_string()),
    ///     storage: Some("256".to_string()),
    ///     ..Default::default()
    /// };
    /// let filter = VariantFilter::from_query(&query).unwrap();
    /// assert!(filter.model.unwrap().is_match("iPhone 13 Pro"));
    /// ```
    pub fn from_query(query: &VariantQuery) -> ValidationResult<Self> {
        if let Some(min) = query.min_price {
            validate_price_cents("min_price", min)?;
        }
        if let Some(max) = query.max_price {
            validate_price_cents("max_price", max)?;
        }
        if let (Some(min), Some(max)) = (query.min_price, query.max_price) {
            if min > max {
                return Err(ValidationError::InvalidFormat {
                    field: "min_price".to_string(),
                    reason: "must not exceed max_price".to_string(),
                });
            }
        }

        Ok(VariantFilter {
            device_type: non_blank(&query.device_type)
                .map(str::parse::<DeviceType>)
                .transpose()?,
            model: non_blank(&query.model).map(|p| pattern("model", p)).transpose()?,
            condition: non_blank(&query.condition).map(str::to_string),
            battery: non_blank(&query.battery).map(str::to_string),
            color: non_blank(&query.color).map(|p| pattern("color", p)).transpose()?,
            storage: non_blank(&query.storage).map(DimensionValue::text),
            ram: query.ram,
            cpu: non_blank(&query.cpu).map(|p| pattern("cpu", p)).transpose()?,
            connectivity: non_blank(&query.connectivity).map(str::to_string),
            min_price: query.min_price,
            max_price: query.max_price,
        })
    }

    /// Returns true if `variant` satisfies every set condition.
    pub fn matches(&self, variant: &Variant) -> bool {
        fn regex_on(re: &Option<Regex>, value: Option<&str>) -> bool {
            match re {
                None => true,
                Some(re) => value.is_some_and(|v| re.is_match(v)),
            }
        }

        self.device_type.map_or(true, |d| variant.device_type() == d)
            && regex_on(&self.model, Some(variant.model.as_str()))
            && self.condition.as_ref().map_or(true, |c| *c == variant.condition)
            && self.battery.as_ref().map_or(true, |b| *b == variant.battery)
            && regex_on(&self.color, Some(variant.color.as_str()))
            && self.storage.as_ref().map_or(true, |s| *s == variant.storage)
            && self.ram.map_or(true, |r| variant.ram() == Some(r))
            && regex_on(&self.cpu, variant.cpu())
            && self
                .connectivity
                .as_deref()
                .map_or(true, |c| variant.connectivity() == Some(c))
            && self.min_price.map_or(true, |min| variant.price_cents >= min)
            && self.max_price.map_or(true, |max| variant.price_cents <= max)
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Resolves optional page parameters.
    ///
    /// A missing or zero page becomes 1; a missing or zero limit becomes
    /// `default_limit`; limits above `max_limit` are clamped.
    pub fn resolve(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        let limit = limit
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .clamp(1, max_limit.max(1));
        Pagination { page, limit }
    }

    /// Number of items to skip.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1).saturating_mul(self.limit as usize)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches across all pages.
    pub total: usize,
    pub page: u32,
    pub pages: u32,
    pub limit: u32,
}

impl<T> Page<T> {
    /// Cuts the requested page out of the full match list.
    pub fn paginate(all: Vec<T>, pagination: Pagination) -> Self {
        let total = all.len();
        let limit = pagination.limit.max(1);
        let pages = total.div_ceil(limit as usize) as u32;
        let items = all
            .into_iter()
            .skip(pagination.offset())
            .take(limit as usize)
            .collect();

        Page {
            items,
            total,
            page: pagination.page,
            pages,
            limit,
        }
    }

    /// Number of items on this page.
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
