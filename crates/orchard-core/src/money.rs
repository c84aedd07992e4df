//! # Money Module
//!
//! Provides the `Money` type for variant prices and order totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  899.99 × 3 in floating point = 2699.9700000000003  ❌                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    89999 cents × 3 = 269997 cents  ✅                                   │
//! │                                                                         │
//! │  Catalog prices, price ranges and order totals are all cents.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orchard_core::money::Money;
//!
//! let price = Money::from_cents(89_999); // $899.99
//! assert_eq!(price.checked_line_total(2), Some(Money::from_cents(179_998)));
//!
//! // Legacy catalog files carry dollars
//! assert_eq!(Money::from_dollars(899.99), Some(price));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// Serializes as a bare integer so wire payloads carry `price_cents: 89999`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use orchard_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Converts a dollar amount, rounding to the nearest cent.
    ///
    /// Returns `None` for negative, non-finite or out-of-range amounts.
    ///
    /// ## Example
    /// ```rust
    /// use orchard_core::money::Money;
    ///
    /// assert_eq!(Money::from_dollars(900.0), Some(Money::from_cents(90_000)));
    /// assert_eq!(Money::from_dollars(-1.0), None);
    /// ```
    pub fn from_dollars(dollars: f64) -> Option<Self> {
        if !dollars.is_finite() || dollars < 0.0 {
            return None;
        }

        let cents = (dollars * 100.0).round();
        if cents >= i64::MAX as f64 {
            return None;
        }

        Some(Money(cents as i64))
    }

    /// Multiplies by a quantity, returning `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use orchard_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(29_900);
    /// assert_eq!(unit_price.checked_line_total(3), Some(Money::from_cents(89_700)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_line_total(2), None);
    /// ```
    #[inline]
    pub fn checked_line_total(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two values, returning `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `$899.99`. Debug/log output only.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Legacy Dollar Fields
// =============================================================================

/// Serde adapter for legacy `price` fields that carry dollars instead of
/// cents: `899.99`, `900` or `"$899.99"`. Decodes into cents.
///
/// ## Usage
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Row {
///     #[serde(default, with = "orchard_core::money::dollars")]
///     price: Option<i64>,
/// }
///
/// let row: Row = serde_json::from_str(r#"{"price": "$899.99"}"#).unwrap();
/// assert_eq!(row.price, Some(89_999));
/// ```
pub mod dollars {
    use serde::de::{self, Deserializer, Unexpected};
    use serde::{Deserialize, Serializer};

    use super::Money;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let dollars = match Option::<Raw>::deserialize(deserializer)? {
            None => return Ok(None),
            Some(Raw::Number(n)) => n,
            Some(Raw::Text(text)) => text
                .trim()
                .trim_start_matches('$')
                .replace(',', "")
                .parse::<f64>()
                .map_err(|_| {
                    <D::Error as de::Error>::invalid_value(Unexpected::Str(&text), &"a dollar amount")
                })?,
        };

        Money::from_dollars(dollars)
            .map(|money| Some(money.cents()))
            .ok_or_else(|| {
                <D::Error as de::Error>::invalid_value(
                    Unexpected::Float(dollars),
                    &"a non-negative dollar amount",
                )
            })
    }

    pub fn serialize<S>(cents: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match cents {
            Some(cents) => serializer.serialize_some(&(*cents as f64 / 100.0)),
            None => serializer.serialize_none(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
