//! # Validation Module
//!
//! Input validation for catalog and order data.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operation boundary (orchard-api)                              │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── THIS MODULE: field and business rule validation                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  ├── UNIQUE constraints (user email)                                    │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bulk payloads are validated in full before anything is written: a single
//! bad item rejects the whole batch.

use serde::{Deserialize, Serialize};

use crate::dimension::DimensionValue;
use crate::error::ValidationError;
use crate::types::{DeviceSpec, DeviceType, NewUser, NewVariant, UserUpdate, VariantInput};
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field and returns it trimmed.
///
/// ## Example
/// ```rust
/// use orchard_core::validation::validate_required_text;
///
/// assert_eq!(validate_required_text("color", Some(" Black ")).unwrap(), "Black");
/// assert!(validate_required_text("color", Some("  ")).is_err());
/// assert!(validate_required_text("color", None).is_err());
/// ```
pub fn validate_required_text(field: &str, value: Option<&str>) -> ValidationResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::required(field)),
    }
}

/// Validates a model name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_model_name(model: Option<&str>) -> ValidationResult<String> {
    let model = validate_required_text("model", model)?;

    if model.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "model".to_string(),
            max: 200,
        });
    }

    Ok(model)
}

/// Validates a person's name.
pub fn validate_user_name(name: &str) -> ValidationResult<String> {
    let name = validate_required_text("name", Some(name))?;

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(name)
}

/// Validates an email address and returns it trimmed and lowercased.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a
/// domain containing a dot.
///
/// ## Example
/// ```rust
/// use orchard_core::validation::validate_email;
///
/// assert_eq!(validate_email(" Ann@Example.com ").unwrap(), "ann@example.com");
/// assert!(validate_email("ann@localhost").is_err());
/// assert!(validate_email("not-an-email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = validate_required_text("email", Some(email))?.to_lowercase();

    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: reason.to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }

    let (local, domain) = email
        .split_once('@')
        .ok_or_else(|| invalid("must contain @"))?;

    if local.is_empty() || domain.contains('@') {
        return Err(invalid("must contain exactly one @ after a local part"));
    }

    let valid_domain = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());

    if !valid_domain {
        return Err(invalid("domain must contain a dot"));
    }

    Ok(email)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an order line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
///
/// ## Example
/// ```rust
/// use orchard_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents("price_cents", 89_999).is_ok());
/// assert!(validate_price_cents("price_cents", 0).is_ok());
/// assert!(validate_price_cents("price_cents", -100).is_err());
/// ```
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Variant Validators
// =============================================================================

fn required_value(field: &str, value: Option<&DimensionValue>) -> ValidationResult<DimensionValue> {
    match value {
        Some(v) if !v.is_blank() => Ok(match v {
            DimensionValue::Text(s) => DimensionValue::text(s.trim()),
            other => other.clone(),
        }),
        _ => Err(ValidationError::required(field)),
    }
}

/// Validates one raw variant from the bucket of `bucket` devices.
///
/// A missing `device_type` is taken from the bucket; a conflicting one is
/// rejected. Laptops need `cpu` and `ram`, tablets need `connectivity`;
/// device-specific fields sent for other devices are ignored.
pub fn validate_variant_input(
    input: &VariantInput,
    bucket: DeviceType,
) -> ValidationResult<NewVariant> {
    let device_type = input.device_type.unwrap_or(bucket);
    if device_type != bucket {
        return Err(ValidationError::NotAllowed {
            field: "device_type".to_string(),
            allowed: vec![bucket.to_string()],
        });
    }

    let model = validate_model_name(input.model.as_deref())?;
    let price_cents = input
        .price_cents
        .or(input.legacy_price_cents)
        .ok_or_else(|| ValidationError::required("price_cents"))?;
    validate_price_cents("price_cents", price_cents)?;

    let condition = validate_required_text("condition", input.condition.as_deref())?;
    let color = validate_required_text("color", input.color.as_deref())?;
    let battery = required_value("battery", input.battery.as_ref())?.to_string();
    let storage = required_value("storage", input.storage.as_ref())?;

    let spec = match device_type {
        DeviceType::Phone => DeviceSpec::Phone,
        DeviceType::Laptop => {
            let ram = input.ram.ok_or_else(|| ValidationError::required("ram"))?;
            if ram == 0 {
                return Err(ValidationError::MustBePositive {
                    field: "ram".to_string(),
                });
            }
            DeviceSpec::Laptop {
                cpu: validate_required_text("cpu", input.cpu.as_deref())?,
                ram,
            }
        }
        DeviceType::Tablet => DeviceSpec::Tablet {
            connectivity: validate_required_text("connectivity", input.connectivity.as_deref())?,
        },
    };

    let image = input
        .image
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Ok(NewVariant {
        model,
        price_cents,
        image,
        condition,
        battery,
        color,
        storage,
        spec,
    })
}

/// A bulk insert payload, grouped by device type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkVariants {
    #[serde(default, alias = "iPhones")]
    pub phones: Vec<VariantInput>,
    #[serde(default, alias = "MacBooks")]
    pub laptops: Vec<VariantInput>,
    #[serde(default, alias = "iPads")]
    pub tablets: Vec<VariantInput>,
}

impl BulkVariants {
    /// Total number of items across all buckets.
    pub fn len(&self) -> usize {
        self.phones.len() + self.laptops.len() + self.tablets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn buckets(&self) -> [(DeviceType, &[VariantInput]); 3] {
        [
            (DeviceType::Phone, self.phones.as_slice()),
            (DeviceType::Laptop, self.laptops.as_slice()),
            (DeviceType::Tablet, self.tablets.as_slice()),
        ]
    }
}

/// Validates every item of a bulk payload.
///
/// Items are numbered phones first, then laptops, then tablets; the first
/// invalid item rejects the batch and is reported with its number.
pub fn validate_bulk(payload: &BulkVariants) -> ValidationResult<Vec<NewVariant>> {
    if payload.is_empty() {
        return Err(ValidationError::required("products"));
    }

    let mut validated = Vec::with_capacity(payload.len());
    for (device_type, items) in payload.buckets() {
        for input in items {
            let index = validated.len();
            validated.push(validate_variant_input(input, device_type).map_err(|e| e.at(index))?);
        }
    }

    Ok(validated)
}

// =============================================================================
// User Validators
// =============================================================================

/// Validates and normalizes a new user.
pub fn validate_new_user(user: &NewUser) -> ValidationResult<NewUser> {
    Ok(NewUser {
        name: validate_user_name(&user.name)?,
        email: validate_email(&user.email)?,
        phone: user.phone.as_deref().map(str::trim).map(str::to_string),
        address: user.address.clone(),
    })
}

/// Validates and normalizes a profile update.
pub fn validate_user_update(update: &UserUpdate) -> ValidationResult<UserUpdate> {
    Ok(UserUpdate {
        name: update.name.as_deref().map(validate_user_name).transpose()?,
        email: update.email.as_deref().map(validate_email).transpose()?,
        phone: update.phone.as_deref().map(str::trim).map(str::to_string),
        address: update.address.clone(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
