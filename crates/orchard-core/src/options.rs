//! # Configuration Aggregator
//!
//! Derives the legal values of every dimension of a model, plus its price
//! range, from the variants currently in the catalog.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  variants of (model, device_type)                                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  OptionFilter  ── "condition = Used" narrows what remains               │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  collect each dimension ──► order_values() ──► OptionSet                │
//! │                                                  condition: [..]        │
//! │                                                  storage:   [..]        │
//! │                                                  cpu/ram (laptops)      │
//! │                                                  connectivity (tablets) │
//! │                                                  price: {min, max}|null │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::dimension::DimensionValue;
use crate::money::Money;
use crate::ordering::order_values;
use crate::types::{DeviceType, Variant};

// =============================================================================
// Option Filter
// =============================================================================

/// Dimension values the shopper has already chosen.
///
/// Any subset may be set; unset fields do not narrow anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionFilter {
    pub condition: Option<String>,
    pub storage: Option<DimensionValue>,
    pub color: Option<String>,
    pub battery: Option<String>,
    pub cpu: Option<String>,
    pub ram: Option<u32>,
    pub connectivity: Option<String>,
}

impl OptionFilter {
    /// Returns true if no dimension is constrained.
    pub fn is_empty(&self) -> bool {
        self.condition.is_none()
            && self.storage.is_none()
            && self.color.is_none()
            && self.battery.is_none()
            && self.cpu.is_none()
            && self.ram.is_none()
            && self.connectivity.is_none()
    }

    /// Returns true if the variant agrees with every constrained dimension.
    ///
    /// A device-specific constraint never matches a variant that lacks the
    /// dimension (a `cpu` filter excludes every tablet).
    pub fn matches(&self, variant: &Variant) -> bool {
        fn eq<T: PartialEq + ?Sized>(wanted: Option<&T>, actual: Option<&T>) -> bool {
            match wanted {
                None => true,
                Some(w) => actual == Some(w),
            }
        }

        eq(self.condition.as_deref(), Some(variant.condition.as_str()))
            && eq(self.storage.as_ref(), Some(&variant.storage))
            && eq(self.color.as_deref(), Some(variant.color.as_str()))
            && eq(self.battery.as_deref(), Some(variant.battery.as_str()))
            && eq(self.cpu.as_deref(), variant.cpu())
            && eq(self.ram.as_ref(), variant.ram().as_ref())
            && eq(self.connectivity.as_deref(), variant.connectivity())
    }
}

// =============================================================================
// Option Set
// =============================================================================

/// Lowest and highest price of a non-empty variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Money,
    pub max: Money,
}

/// The ordered distinct values of every dimension of a model.
///
/// `price` is `None` when no variant survived the filter; an empty set has
/// no price range rather than a zero one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSet {
    pub model: String,
    pub device_type: DeviceType,
    pub condition: Vec<String>,
    pub storage: Vec<DimensionValue>,
    pub color: Vec<String>,
    pub battery: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<Vec<String>>,
    pub price: Option<PriceRange>,
}

impl OptionSet {
    /// Returns true if no variant contributed to this set.
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
    }
}

/// Builds the option set of `model` for `device_type`.
///
/// Variants of other models or device types are ignored, so callers may
/// pass a broader fetch than strictly necessary.
///
/// ## Example
/// ```rust,ignore
/// let variants = db.variants().find_by_model("X1", DeviceType::Laptop).await?;
/// let options = aggregate_options("X1", DeviceType::Laptop, &variants, &OptionFilter::default());
/// assert_eq!(options.cpu, Some(vec!["M1".into(), "M2".into()]));
/// ```
pub fn aggregate_options(
    model: &str,
    device_type: DeviceType,
    variants: &[Variant],
    filter: &OptionFilter,
) -> OptionSet {
    let selected: Vec<&Variant> = variants
        .iter()
        .filter(|v| v.model == model && v.device_type() == device_type)
        .filter(|v| filter.matches(v))
        .collect();

    let price = selected.iter().map(|v| Money::from_cents(v.price_cents)).fold(None, |range, p| {
        Some(match range {
            None => PriceRange { min: p, max: p },
            Some(PriceRange { min, max }) => PriceRange {
                min: min.min(p),
                max: max.max(p),
            },
        })
    });

    let cpu = (device_type == DeviceType::Laptop).then(|| {
        order_values(selected.iter().filter_map(|v| v.cpu()).map(str::to_string))
    });
    let ram = (device_type == DeviceType::Laptop)
        .then(|| order_values(selected.iter().filter_map(|v| v.ram())));
    let connectivity = (device_type == DeviceType::Tablet).then(|| {
        order_values(
            selected
                .iter()
                .filter_map(|v| v.connectivity())
                .map(str::to_string),
        )
    });

    OptionSet {
        model: model.to_string(),
        device_type,
        condition: order_values(selected.iter().map(|v| v.condition.clone())),
        storage: order_values(selected.iter().map(|v| v.storage.clone())),
        color: order_values(selected.iter().map(|v| v.color.clone())),
        battery: order_values(selected.iter().map(|v| v.battery.clone())),
        cpu,
        ram,
        connectivity,
        price,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
