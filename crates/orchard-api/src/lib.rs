//! # orchard-api: Operation Contracts for Orchard
//!
//! The operations a routing layer exposes. Each one validates its input,
//! reads what it needs from the store, hands the records to orchard-core
//! and maps every failure to an [`ApiError`].
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Orchard Request Flow                               │
//! │                                                                         │
//! │  Router (external)                                                     │
//! │       │  GET /variants/options?model=iPhone%2013&device_type=phone     │
//! │       ▼                                                                 │
//! │  handlers::variant::get_options(&state, query)                         │
//! │       │                                                                 │
//! │       ├── state.db.variants().find_by_model(..)   ← orchard-db         │
//! │       │                                                                 │
//! │       ├── aggregate_options(..)                   ← orchard-core       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Result<OptionSet, ApiError>                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Router serialises the value, or ApiError with status()                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`handlers`] - The operations, grouped by resource
//! - [`config`] - Environment configuration
//! - [`error`] - ApiError and its conversions
//! - [`telemetry`] - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod handlers;
pub mod telemetry;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

use orchard_db::Database;
use tracing::info;

/// Shared state handed to every operation.
///
/// Cheap to clone: the database handle shares its pool.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: ApiConfig,
}

impl AppState {
    /// Connects to the configured database and runs migrations.
    pub async fn connect(config: ApiConfig) -> ApiResult<Self> {
        let db = Database::new(config.db_config()).await?;
        info!(path = %config.database_path.display(), "Orchard API ready");
        Ok(AppState { db, config })
    }

    /// Wraps an existing database handle.
    pub fn new(db: Database, config: ApiConfig) -> Self {
        AppState { db, config }
    }
}
