//! # Error Types
//!
//! Domain-specific error types for orchard-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orchard-core errors (this file)                                       │
//! │  ├── CoreError        - Catalog / order rule violations                │
//! │  └── ValidationError  - Input field validation failures                │
//! │                                                                         │
//! │  orchard-db errors (separate crate)                                    │
//! │  └── DbError          - Store operation failures                       │
//! │                                                                         │
//! │  orchard-api errors                                                    │
//! │  └── ApiError         - What the routing layer sees (serialized)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Caller       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::dimension::Dimension;
use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core catalog errors.
///
/// These errors represent rule violations detected before anything is
/// written to the store.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    ///
    /// ## When This Occurs
    /// - An order line names a variant id that is not in the catalog
    /// - An option set is requested without a model or device type
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A requested dimension value disagrees with the authoritative record.
    ///
    /// ## User Workflow
    /// ```text
    /// Order line: { storage: "128", ... } → variant stores 256
    ///      │
    ///      ▼
    /// InvalidConfiguration { field: storage, requested: "128", stored: "256" }
    ///      │
    ///      ▼
    /// Whole order rejected, nothing persisted
    /// ```
    #[error("Invalid configuration: {field} mismatch (requested {requested}, available {stored})")]
    InvalidConfiguration {
        field: Dimension,
        requested: String,
        stored: String,
    },

    /// Order is in a status that does not allow the requested change.
    #[error("Order {order_id} is {from}, cannot move to {to}")]
    InvalidStatusTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an InvalidConfiguration error for a mismatched dimension.
    pub fn mismatch(
        field: Dimension,
        requested: impl ToString,
        stored: impl ToString,
    ) -> Self {
        CoreError::InvalidConfiguration {
            field,
            requested: requested.to_string(),
            stored: stored.to_string(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised at the boundary, before any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad email, invalid pattern).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A member of a batch failed validation.
    #[error("item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Creates a Required error for the given field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Wraps this error with the position of the failing batch member.
    pub fn at(self, index: usize) -> Self {
        ValidationError::Item {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping batch position wrappers.
    pub fn root(&self) -> &ValidationError {
        match self {
            ValidationError::Item { source, .. } => source.root(),
            other => other,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::mismatch(Dimension::Storage, "128", "256");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: storage mismatch (requested 128, available 256)"
        );

        let err = CoreError::not_found("Variant", "abc");
        assert_eq!(err.to_string(), "Variant not found: abc");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::required("color");
        assert_eq!(err.to_string(), "color is required");

        let err = ValidationError::required("cpu").at(4);
        assert_eq!(err.to_string(), "item 4: cpu is required");
        assert!(matches!(err.root(), ValidationError::Required { field } if field == "cpu"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("model").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
