//! # Configuration Dimensions
//!
//! Names of the configurable attributes of a variant, and the tagged value
//! type used for dimensions whose stored form is a number for some devices
//! and a string for others.
//!
//! ## Canonical Form
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Input            Canonical DimensionValue                              │
//! │  ─────            ────────────────────────                              │
//! │  256              Number(256)                                          │
//! │  "256"            Number(256)     ← numeric text is a number           │
//! │  " 512 "          Number(512)                                          │
//! │  "64GB"           Text("64GB")                                         │
//! │                                                                         │
//! │  Equality, hashing and ordering all work on the canonical form, so     │
//! │  an order requesting "256" matches a variant storing 256.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::ordering::{parse_numeric, Orderable, SortKey};
use crate::types::DeviceType;

// =============================================================================
// Dimension
// =============================================================================

/// A named configurable attribute of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Condition,
    Storage,
    Color,
    Battery,
    Cpu,
    Ram,
    Connectivity,
}

impl Dimension {
    /// Dimensions every variant carries.
    pub const COMMON: [Dimension; 4] = [
        Dimension::Condition,
        Dimension::Storage,
        Dimension::Color,
        Dimension::Battery,
    ];

    /// Returns the wire name of the dimension.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Dimension::Condition => "condition",
            Dimension::Storage => "storage",
            Dimension::Color => "color",
            Dimension::Battery => "battery",
            Dimension::Cpu => "cpu",
            Dimension::Ram => "ram",
            Dimension::Connectivity => "connectivity",
        }
    }

    /// Returns true if variants of `device_type` carry this dimension.
    pub fn applies_to(&self, device_type: DeviceType) -> bool {
        match self {
            Dimension::Cpu | Dimension::Ram => device_type == DeviceType::Laptop,
            Dimension::Connectivity => device_type == DeviceType::Tablet,
            _ => true,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Dimension Value
// =============================================================================

/// A dimension value that is either numeric or free text.
///
/// Always held in canonical form: text that parses as a finite number is
/// stored as [`DimensionValue::Number`]. Build values through the `From`
/// impls or [`DimensionValue::text`] / [`DimensionValue::number`].
#[derive(Debug, Clone)]
pub enum DimensionValue {
    /// Numeric value (e.g. storage in GB).
    Number(f64),
    /// Non-numeric value (e.g. `"64GB"`).
    Text(String),
}

impl DimensionValue {
    /// Creates a value from text, canonicalising numeric text.
    pub fn text(s: impl Into<String>) -> Self {
        let s = s.into();
        match parse_numeric(&s) {
            Some(n) => DimensionValue::number(n),
            None => DimensionValue::Text(s),
        }
    }

    /// Creates a numeric value. Non-finite input is kept as text.
    pub fn number(n: f64) -> Self {
        if !n.is_finite() {
            return DimensionValue::Text(n.to_string());
        }
        // -0.0 and 0.0 must hash the same
        DimensionValue::Number(if n == 0.0 { 0.0 } else { n })
    }

    /// Returns the numeric value, if any.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            DimensionValue::Number(n) => Some(*n),
            DimensionValue::Text(_) => None,
        }
    }

    /// Returns true for blank text.
    pub fn is_blank(&self) -> bool {
        matches!(self, DimensionValue::Text(s) if s.trim().is_empty())
    }

    /// Returns the integral value when the number has no fractional part.
    fn as_integral(&self) -> Option<i64> {
        match self {
            DimensionValue::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => Some(*n as i64),
            _ => None,
        }
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        DimensionValue::text(s)
    }
}

impl From<String> for DimensionValue {
    fn from(s: String) -> Self {
        DimensionValue::text(s)
    }
}

impl From<u32> for DimensionValue {
    fn from(n: u32) -> Self {
        DimensionValue::number(f64::from(n))
    }
}

impl From<i64> for DimensionValue {
    fn from(n: i64) -> Self {
        DimensionValue::number(n as f64)
    }
}

impl From<f64> for DimensionValue {
    fn from(n: f64) -> Self {
        DimensionValue::number(n)
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.as_integral(), self) {
            (Some(i), _) => write!(f, "{}", i),
            (None, DimensionValue::Number(n)) => write!(f, "{}", n),
            (None, DimensionValue::Text(s)) => f.write_str(s),
        }
    }
}

impl Ord for DimensionValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for DimensionValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DimensionValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DimensionValue {}

impl Hash for DimensionValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            DimensionValue::Number(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            DimensionValue::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl Orderable for DimensionValue {
    fn sort_key(&self) -> SortKey<'_> {
        match self {
            DimensionValue::Number(n) => SortKey::Numeric(*n),
            DimensionValue::Text(s) => SortKey::Text(s),
        }
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for DimensionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self.as_integral(), self) {
            (Some(i), _) => serializer.serialize_i64(i),
            (None, DimensionValue::Number(n)) => serializer.serialize_f64(*n),
            (None, DimensionValue::Text(s)) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for DimensionValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DimensionValueVisitor;

        impl Visitor<'_> for DimensionValueVisitor {
            type Value = DimensionValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number or a string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(DimensionValue::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(DimensionValue::number(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(DimensionValue::number(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(DimensionValue::text(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(DimensionValue::text(v))
            }
        }

        deserializer.deserialize_any(DimensionValueVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_numeric_text_is_canonicalised() {
        assert_eq!(DimensionValue::from("256"), DimensionValue::from(256u32));
        assert_eq!(DimensionValue::from(" 512 "), DimensionValue::from(512u32));
        assert_ne!(DimensionValue::from("128"), DimensionValue::from(256u32));
        assert!(matches!(DimensionValue::from("64GB"), DimensionValue::Text(_)));
    }

    #[test]
    fn test_hash_agrees_with_eq() {
        let set: HashSet<DimensionValue> = ["256", "256.0", "64GB"]
            .into_iter()
            .map(DimensionValue::from)
            .chain([DimensionValue::from(256u32)])
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_numbers_order_before_text() {
        assert!(DimensionValue::from(1024u32) < DimensionValue::from("1TB"));
        assert!(DimensionValue::from(64u32) < DimensionValue::from(128u32));
    }

    #[test]
    fn test_display() {
        assert_eq!(DimensionValue::from(256u32).to_string(), "256");
        assert_eq!(DimensionValue::from(1.5).to_string(), "1.5");
        assert_eq!(DimensionValue::from("64GB").to_string(), "64GB");
    }

    #[test]
    fn test_serde_round_trip_forms() {
        let v: DimensionValue = serde_json::from_str("\"256\"").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "256");

        let v: DimensionValue = serde_json::from_str("\"64GB\"").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "\"64GB\"");

        let v: DimensionValue = serde_json::from_str("1.5").unwrap();
        assert_eq!(serde_json::to_string(&v).unwrap(), "1.5");
    }

    #[test]
    fn test_dimension_applicability() {
        assert!(Dimension::Cpu.applies_to(DeviceType::Laptop));
        assert!(!Dimension::Cpu.applies_to(DeviceType::Tablet));
        assert!(Dimension::Connectivity.applies_to(DeviceType::Tablet));
        assert!(!Dimension::Connectivity.applies_to(DeviceType::Phone));
        assert!(Dimension::Storage.applies_to(DeviceType::Phone));
    }
}
