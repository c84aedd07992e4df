//! # orchard-core: Pure Catalog Logic for Orchard
//!
//! This crate is the variant configuration and filtering engine. Every
//! function takes already-fetched records and returns derived structures;
//! nothing here touches the database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orchard Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Routing layer (external)                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    orchard-api (operations)                     │   │
//! │  │    list_variants, get_options, create_order, etc.              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ orchard-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────────┐ ┌──────────┐      │   │
//! │  │   │ ordering │ │ options  │ │ combinations │ │ selector │      │   │
//! │  │   └──────────┘ └──────────┘ └──────────────┘ └──────────┘      │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────────┐ ┌──────────┐      │   │
//! │  │   │  order   │ │  filter  │ │  validation  │ │  money   │      │   │
//! │  │   └──────────┘ └──────────┘ └──────────────┘ └──────────┘      │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  orchard-db (Database Layer)                    │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Variant, Order, User, etc.)
//! - [`dimension`] - Dimension names and the number-or-text value type
//! - [`ordering`] - Deterministic order for option lists
//! - [`options`] - Option sets and price ranges per model
//! - [`combinations`] - Stocked configuration tuples
//! - [`selector`] - Lowest-price variant per model
//! - [`order`] - Order line validation and status changes
//! - [`filter`] - Listing filters and pagination
//! - [`validation`] - Field validation
//! - [`money`] - Integer cents
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use orchard_core::ordering::order_values;
//! use orchard_core::DimensionValue;
//!
//! let storage = order_values(vec![
//!     DimensionValue::from("1TB"),
//!     DimensionValue::from(512u32),
//!     DimensionValue::from("128"),
//! ]);
//! assert_eq!(storage[0], DimensionValue::from(128u32));
//! assert_eq!(storage[2], DimensionValue::from("1TB"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod combinations;
pub mod dimension;
pub mod error;
pub mod filter;
pub mod money;
pub mod options;
pub mod order;
pub mod ordering;
pub mod selector;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use combinations::{enumerate_combinations, Combination, CombinationSet};
pub use dimension::{Dimension, DimensionValue};
pub use error::{CoreError, CoreResult, ValidationError};
pub use filter::{Page, Pagination, VariantFilter, VariantQuery};
pub use money::Money;
pub use options::{aggregate_options, OptionFilter, OptionSet, PriceRange};
pub use order::{build_order, plan_status_change, validate_line, OrderDraft, PointerUpdate};
pub use selector::{select_lowest_price, LowestPriceCatalog};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when a listing does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Largest page a listing may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Maximum quantity of a single order line.
///
/// Catches typos like 1000 instead of 10.
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Variants written per statement by bulk loaders.
pub const BULK_BATCH_SIZE: usize = 1000;
