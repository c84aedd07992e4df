//! # Repository Module
//!
//! Database repository implementations for Orchard.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  orchard-api operation                                                 │
//! │       │                                                                 │
//! │       │  db.variants().find_by_model("iPhone 13", Phone)               │
//! │       ▼                                                                 │
//! │  VariantRepository / UserRepository / OrderRepository                  │
//! │       │                                                                 │
//! │       │  SQL (runtime queries, bound parameters)                       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Repositories return orchard-core types; every derived view (option    │
//! │  sets, combinations, lowest prices) is computed by orchard-core over   │
//! │  what they return.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`variant::VariantRepository`] - Catalog reads, bulk insert, guarded update/delete
//! - [`user::UserRepository`] - Profiles, current-order pointer, purchase history
//! - [`order::OrderRepository`] - Orders with their line items

pub mod order;
pub mod user;
pub mod variant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// Ids bound per `IN (...)` query. Longer lists are split, keeping each
/// statement well under SQLite's bound-variable limit.
pub(crate) const IN_LIST_CHUNK: usize = 500;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Encodes a value for a JSON text column.
pub(crate) fn to_json<T: Serialize>(value: &T) -> DbResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Encodes an optional value for a nullable JSON text column.
pub(crate) fn to_json_opt<T: Serialize>(value: Option<&T>) -> DbResult<Option<String>> {
    value.map(to_json).transpose()
}

/// Decodes a JSON text column, reporting the owning row on failure.
pub(crate) fn from_json<T: DeserializeOwned>(entity: &str, id: &str, text: &str) -> DbResult<T> {
    serde_json::from_str(text).map_err(|e| DbError::corrupt(entity, id, e))
}
