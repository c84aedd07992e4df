//! # Domain Types
//!
//! Core domain types used throughout Orchard.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Variant      │   │     Order       │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  model          │   │  user_id (FK)   │   │  email (unique) │       │
//! │  │  price_cents    │   │  items[]        │   │  current_order  │       │
//! │  │  condition ...  │   │  status         │   │  purchase_hist. │       │
//! │  │  spec ──────────┼─┐ │  total_cents    │   └─────────────────┘       │
//! │  └─────────────────┘ │ └─────────────────┘                             │
//! │                      │                                                  │
//! │  ┌───────────────────▼─────────────────────────────┐                   │
//! │  │ DeviceSpec (tagged by device_type)              │                   │
//! │  │   Phone                                         │                   │
//! │  │   Laptop { cpu, ram }                           │                   │
//! │  │   Tablet { connectivity }                       │                   │
//! │  └─────────────────────────────────────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Device-specific dimensions live inside [`DeviceSpec`], so a laptop
//! without a CPU or a phone with a connectivity option cannot be built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::dimension::DimensionValue;
use crate::error::ValidationError;

// =============================================================================
// Device Type
// =============================================================================

/// The kind of device a variant belongs to.
///
/// Ordering (`Phone < Laptop < Tablet`) is the presentation order used by
/// the lowest-price listing. Sorting the legacy names (`iPad`, `iPhone`,
/// `MacBook`) as text would give a different order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    #[serde(alias = "iPhone")]
    Phone,
    #[serde(alias = "MacBook")]
    Laptop,
    #[serde(alias = "iPad")]
    Tablet,
}

impl DeviceType {
    /// All device types in presentation order.
    pub const ALL: [DeviceType; 3] = [DeviceType::Phone, DeviceType::Laptop, DeviceType::Tablet];

    /// Returns the wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Phone => "phone",
            DeviceType::Laptop => "laptop",
            DeviceType::Tablet => "tablet",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses query-string values, accepting the legacy catalog names too.
impl FromStr for DeviceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "phone" | "Phone" | "iPhone" => Ok(DeviceType::Phone),
            "laptop" | "Laptop" | "MacBook" => Ok(DeviceType::Laptop),
            "tablet" | "Tablet" | "iPad" => Ok(DeviceType::Tablet),
            _ => Err(ValidationError::NotAllowed {
                field: "device_type".to_string(),
                allowed: DeviceType::ALL.iter().map(|d| d.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Device Spec
// =============================================================================

/// Device-specific dimensions, tagged by device type.
///
/// Flattened into [`Variant`] on the wire:
/// `{"device_type": "laptop", "cpu": "M2", "ram": 16, ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "device_type", rename_all = "snake_case")]
pub enum DeviceSpec {
    #[serde(alias = "iPhone")]
    Phone,
    #[serde(alias = "MacBook")]
    Laptop { cpu: String, ram: u32 },
    #[serde(alias = "iPad")]
    Tablet { connectivity: String },
}

impl DeviceSpec {
    /// Returns the device type this spec describes.
    pub fn device_type(&self) -> DeviceType {
        match self {
            DeviceSpec::Phone => DeviceType::Phone,
            DeviceSpec::Laptop { .. } => DeviceType::Laptop,
            DeviceSpec::Tablet { .. } => DeviceType::Tablet,
        }
    }
}

// =============================================================================
// Variant
// =============================================================================

/// One purchasable SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Product line this variant belongs to (e.g. "iPhone 13 Pro").
    pub model: String,

    /// Price in cents.
    pub price_cents: i64,

    /// Optional image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    pub condition: String,

    /// Battery health as listed (e.g. "100", "85%").
    pub battery: String,

    pub color: String,

    /// Numeric GB for phones and laptops, sometimes text for tablets.
    pub storage: DimensionValue,

    /// Device type plus its device-specific dimensions.
    #[serde(flatten)]
    pub spec: DeviceSpec,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// Returns the device type.
    #[inline]
    pub fn device_type(&self) -> DeviceType {
        self.spec.device_type()
    }

    /// CPU, for laptops.
    pub fn cpu(&self) -> Option<&str> {
        match &self.spec {
            DeviceSpec::Laptop { cpu, .. } => Some(cpu),
            _ => None,
        }
    }

    /// RAM in GB, for laptops.
    pub fn ram(&self) -> Option<u32> {
        match &self.spec {
            DeviceSpec::Laptop { ram, .. } => Some(*ram),
            _ => None,
        }
    }

    /// Connectivity option, for tablets.
    pub fn connectivity(&self) -> Option<&str> {
        match &self.spec {
            DeviceSpec::Tablet { connectivity } => Some(connectivity),
            _ => None,
        }
    }
}

/// A validated variant that has not been stored yet.
///
/// Produced by [`crate::validation::validate_variant_input`]; the store
/// assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVariant {
    pub model: String,
    pub price_cents: i64,
    pub image: Option<String>,
    pub condition: String,
    pub battery: String,
    pub color: String,
    pub storage: DimensionValue,
    #[serde(flatten)]
    pub spec: DeviceSpec,
}

impl NewVariant {
    /// Turns this into a stored variant with the given identity.
    pub fn into_variant(self, id: String, now: DateTime<Utc>) -> Variant {
        Variant {
            id,
            model: self.model,
            price_cents: self.price_cents,
            image: self.image,
            condition: self.condition,
            battery: self.battery,
            color: self.color,
            storage: self.storage,
            spec: self.spec,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A raw, unvalidated variant as it arrives in a bulk payload.
///
/// Every field is optional so that a missing one is reported by name
/// instead of as a parse failure.
///
/// Legacy catalog files send `price` in dollars; it is decoded into cents
/// and only used when `price_cents` is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantInput {
    pub device_type: Option<DeviceType>,
    pub model: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(
        default,
        rename = "price",
        with = "crate::money::dollars",
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_price_cents: Option<i64>,
    pub image: Option<String>,
    pub condition: Option<String>,
    pub battery: Option<DimensionValue>,
    pub color: Option<String>,
    pub storage: Option<DimensionValue>,
    pub cpu: Option<String>,
    pub ram: Option<u32>,
    pub connectivity: Option<String>,
}

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, not yet picked up.
    #[default]
    Pending,
    Processing,
    Shipped,
    /// Terminal: order moves to the user's purchase history.
    Delivered,
    /// Terminal: order is dropped as the user's current order.
    Cancelled,
}

impl OrderStatus {
    /// Returns the wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal orders accept no further status changes.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Configuration requested for an order line, as sent by the client.
///
/// `condition`, `storage` and `color` are mandatory; the device-specific
/// fields are optional and only checked when supplied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestedConfiguration {
    pub condition: Option<String>,
    pub storage: Option<DimensionValue>,
    pub color: Option<String>,
    pub cpu: Option<String>,
    pub ram: Option<u32>,
    pub connectivity: Option<String>,
}

/// One line of a create-order request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    #[serde(alias = "productId", alias = "product_id")]
    pub variant_id: String,
    pub configuration: RequestedConfiguration,
    pub quantity: i64,
    pub price_at_purchase_cents: i64,
}

/// Snapshot of the configuration bought, frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineConfiguration {
    pub condition: String,
    pub storage: DimensionValue,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<String>,
}

/// A line item of a placed order. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub variant_id: String,
    pub configuration: LineConfiguration,
    pub quantity: i64,
    /// Unit price in cents at time of purchase (frozen).
    pub price_at_purchase_cents: i64,
}

/// Postal address used for shipping and user profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total_cents: i64,
    pub shipping_address: Option<Address>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Users
// =============================================================================

/// Pointer from a user to the order currently in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentOrder {
    pub order_id: String,
    pub status: OrderStatus,
}

/// A customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<Address>,
    /// Delivered orders, oldest first.
    pub purchase_history: Vec<String>,
    pub current_order: Option<CurrentOrder>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Profile fields a user may change. Anything else is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<Address>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_device_type_from_str_accepts_legacy_names() {
        assert_eq!("iPhone".parse::<DeviceType>().unwrap(), DeviceType::Phone);
        assert_eq!("laptop".parse::<DeviceType>().unwrap(), DeviceType::Laptop);
        assert_eq!("iPad".parse::<DeviceType>().unwrap(), DeviceType::Tablet);
        assert!("watch".parse::<DeviceType>().is_err());
    }

    #[test]
    fn test_device_type_presentation_order() {
        let mut types = vec![DeviceType::Tablet, DeviceType::Phone, DeviceType::Laptop];
        types.sort();
        assert_eq!(types, DeviceType::ALL.to_vec());
    }

    #[test]
    fn test_variant_wire_shape() {
        let variant = NewVariant {
            model: "MacBook Air".to_string(),
            price_cents: 90_000,
            image: None,
            condition: "Used".to_string(),
            battery: "92".to_string(),
            color: "Silver".to_string(),
            storage: DimensionValue::from(256u32),
            spec: DeviceSpec::Laptop {
                cpu: "M1".to_string(),
                ram: 8,
            },
        }
        .into_variant("v-1".to_string(), Utc::now());

        let value = serde_json::to_value(&variant).unwrap();
        assert_eq!(value["device_type"], json!("laptop"));
        assert_eq!(value["cpu"], json!("M1"));
        assert_eq!(value["ram"], json!(8));
        assert_eq!(value["storage"], json!(256));
        assert!(value.get("connectivity").is_none());

        let back: Variant = serde_json::from_value(value).unwrap();
        assert_eq!(back, variant);
        assert_eq!(back.cpu(), Some("M1"));
        assert_eq!(back.connectivity(), None);
    }

    #[test]
    fn test_variant_input_accepts_legacy_payload() {
        let input: VariantInput = serde_json::from_value(json!({
            "device_type": "iPad",
            "model": "iPad Air",
            "price": 449.99,
            "storage": "64GB",
            "battery": 100,
            "connectivity": "WiFi"
        }))
        .unwrap();
        assert_eq!(input.device_type, Some(DeviceType::Tablet));
        assert_eq!(input.price_cents, None);
        assert_eq!(input.legacy_price_cents, Some(44_999));
        assert_eq!(input.battery, Some(DimensionValue::from(100u32)));
        assert!(input.color.is_none());
    }

    #[test]
    fn test_legacy_whole_dollar_price_is_not_cents() {
        let input: VariantInput = serde_json::from_value(json!({ "price": 900 })).unwrap();
        assert_eq!(input.legacy_price_cents, Some(90_000));

        let input: VariantInput = serde_json::from_value(json!({ "price_cents": 900 })).unwrap();
        assert_eq!(input.price_cents, Some(900));
        assert_eq!(input.legacy_price_cents, None);
    }

    #[test]
    fn test_order_status_terminal() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_user_update_rejects_unknown_fields() {
        let err = serde_json::from_value::<UserUpdate>(json!({ "purchase_history": [] }));
        assert!(err.is_err());
        let ok = serde_json::from_value::<UserUpdate>(json!({ "phone": "555-0100" })).unwrap();
        assert_eq!(ok.phone.as_deref(), Some("555-0100"));
    }
}
