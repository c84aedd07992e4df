//! # Operations
//!
//! Async functions a router binds to its routes. Each takes the shared
//! [`AppState`](crate::AppState) plus a deserialised request and returns a
//! serialisable response or an [`ApiError`](crate::ApiError).
//!
//! ## Organization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  handlers/                                                              │
//! │  ├── variant.rs  list_variants, get_variant, get_options,              │
//! │  │               get_combinations, get_lowest_price_per_model,         │
//! │  │               bulk_insert_variants, update_variant, delete_variant  │
//! │  ├── order.rs    create_order, get_order, list_orders_for_user,        │
//! │  │               list_orders_grouped_by_user, update_order_status,     │
//! │  │               delete_order                                          │
//! │  └── user.rs     create_user, get_user, update_user, delete_user       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod order;
pub mod user;
pub mod variant;

use std::time::Instant;

/// Milliseconds since `start`, for `elapsed_ms` log fields.
pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
