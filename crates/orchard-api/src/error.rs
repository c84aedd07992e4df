//! # API Error Type
//!
//! Unified error type for Orchard operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Orchard                                │
//! │                                                                         │
//! │  Router                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  POST /orders                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Operation Function                                              │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation Error? ─── ValidationError ──────────┐              │  │
//! │  │         │                                          │              │  │
//! │  │         ▼                                          ▼              │  │
//! │  │  Rule violation? ───── CoreError ─────────────── ApiError ──────►│  │
//! │  │         │                                          ▲              │  │
//! │  │         ▼                                          │              │  │
//! │  │  Store error? ──────── DbError ───────────────────┘              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄──── HTTP status = ApiError::status(), body = {code, message}        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::fmt;

use orchard_core::{CoreError, ValidationError};
use orchard_db::DbError;

/// Error returned from every operation.
///
/// ## Serialization
/// This is what the router sends back when an operation fails:
/// ```json
/// {
///   "code": "INVALID_CONFIGURATION",
///   "message": "Invalid configuration: storage mismatch (requested 128, available 256)"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

/// Error codes for operation responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Requested configuration disagrees with the variant (400)
    InvalidConfiguration,

    /// Write conflicts with stored state (409)
    Conflict,

    /// Order saved but the user's current-order pointer was not (500)
    OrderPointerNotUpdated,

    /// Store unreachable or failed (500)
    DatabaseError,

    /// Internal error (500)
    Internal,
}

impl ErrorCode {
    /// Returns the wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidConfiguration => "INVALID_CONFIGURATION",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::OrderPointerNotUpdated => "ORDER_POINTER_NOT_UPDATED",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Reports an order write that was persisted while the follow-up write
    /// to the owner's current order or history failed.
    pub fn order_pointer_not_updated(order_id: &str, cause: &ApiError) -> Self {
        ApiError::new(
            ErrorCode::OrderPointerNotUpdated,
            format!(
                "Order {} was saved but the user's current order was not updated: {}",
                order_id, cause.message
            ),
        )
    }

    /// HTTP status equivalent for the router.
    pub fn status(&self) -> u16 {
        match self.code {
            ErrorCode::NotFound => 404,
            ErrorCode::ValidationError | ErrorCode::InvalidConfiguration => 400,
            ErrorCode::Conflict => 409,
            ErrorCode::OrderPointerNotUpdated | ErrorCode::DatabaseError | ErrorCode::Internal => {
                500
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                ApiError::conflict(format!("{} '{}' already exists", field, value))
            }
            DbError::Conflict(message) => ApiError::conflict(message),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation(format!("Invalid reference: {}", message))
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, format!("Store unavailable: {}", e))
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Store unavailable: connection pool exhausted")
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, other.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            e @ CoreError::InvalidConfiguration { .. } => {
                ApiError::new(ErrorCode::InvalidConfiguration, e.to_string())
            }
            e @ CoreError::InvalidStatusTransition { .. } => ApiError::conflict(e.to_string()),
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================
