//! # Value Ordering
//!
//! Deterministic ordering for option lists whose values may be numeric,
//! textual, or a mix of both (storage is `256` for phones and `"64GB"` for
//! some tablets).
//!
//! ## Ordering Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  input (any discovery order):  "1TB", 512, "64GB", 128, 256, 128       │
//! │                                                                         │
//! │  1. numerically parseable values, ascending by numeric value           │
//! │       128, 256, 512                                                     │
//! │  2. everything else, ascending lexicographically                       │
//! │       "1TB", "64GB"                                                     │
//! │  3. duplicates removed                                                 │
//! │                                                                         │
//! │  output: 128, 256, 512, "1TB", "64GB"                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The output depends only on the input *set*: shuffling the input never
//! changes the result, and ordering an ordered list is a no-op.

use std::cmp::Ordering;

/// Parses a string as a finite number, the way option values are classified.
///
/// Surrounding whitespace is ignored; empty strings, `NaN` and infinities are
/// not numeric.
///
/// ## Example
/// ```rust
/// use orchard_core::ordering::parse_numeric;
///
/// assert_eq!(parse_numeric("256"), Some(256.0));
/// assert_eq!(parse_numeric(" 1.5 "), Some(1.5));
/// assert_eq!(parse_numeric("64GB"), None);
/// assert_eq!(parse_numeric(""), None);
/// assert_eq!(parse_numeric("inf"), None);
/// ```
pub fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

// =============================================================================
// Sort Key
// =============================================================================

/// The classification of a value used for ordering.
#[derive(Debug, Clone, Copy)]
pub enum SortKey<'a> {
    /// Numerically parseable value.
    Numeric(f64),
    /// Any other value.
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    /// Classifies a raw string.
    pub fn classify(s: &'a str) -> Self {
        match parse_numeric(s) {
            Some(n) => SortKey::Numeric(n),
            None => SortKey::Text(s),
        }
    }
}

impl Ord for SortKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Numeric(a), SortKey::Numeric(b)) => a.total_cmp(b),
            (SortKey::Numeric(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Numeric(_)) => Ordering::Greater,
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for SortKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortKey<'_> {}

// =============================================================================
// Orderable
// =============================================================================

/// A value that can appear in an option list.
pub trait Orderable {
    /// Returns the ordering classification of this value.
    fn sort_key(&self) -> SortKey<'_>;
}

impl Orderable for String {
    fn sort_key(&self) -> SortKey<'_> {
        SortKey::classify(self)
    }
}

impl Orderable for &str {
    fn sort_key(&self) -> SortKey<'_> {
        SortKey::classify(self)
    }
}

impl Orderable for u32 {
    fn sort_key(&self) -> SortKey<'_> {
        SortKey::Numeric(f64::from(*self))
    }
}

/// Orders and de-duplicates a collection of option values.
///
/// Values with the same sort key but a different representation (`"08"` and
/// `"8"`) are both kept, tie-broken by their own ordering, so the result is
/// still independent of input order.
///
/// ## Example
/// ```rust
/// use orchard_core::ordering::order_values;
///
/// let ordered = order_values(vec![
///     "Silver".to_string(),
///     "512".to_string(),
///     "Black".to_string(),
///     "128".to_string(),
///     "Silver".to_string(),
/// ]);
/// assert_eq!(ordered, vec!["128", "512", "Black", "Silver"]);
/// ```
pub fn order_values<T, I>(values: I) -> Vec<T>
where
    T: Orderable + Ord,
    I: IntoIterator<Item = T>,
{
    let mut ordered: Vec<T> = values.into_iter().collect();
    ordered.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()).then_with(|| a.cmp(b)));
    ordered.dedup();
    ordered
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_numbers_before_text() {
        let ordered = order_values(strings(&["64GB", "1024", "Gold", "128", "1TB"]));
        assert_eq!(ordered, strings(&["128", "1024", "1TB", "64GB", "Gold"]));
    }

    #[test]
    fn test_numeric_order_is_not_lexicographic() {
        let ordered = order_values(strings(&["1024", "256", "64", "2048"]));
        assert_eq!(ordered, strings(&["64", "256", "1024", "2048"]));
    }

    #[test]
    fn test_deduplicates() {
        let ordered = order_values(vec![16u32, 8, 16, 32, 8]);
        assert_eq!(ordered, vec![8, 16, 32]);
    }

    #[test]
    fn test_empty_input() {
        let ordered: Vec<String> = order_values(Vec::new());
        assert!(ordered.is_empty());
    }

    #[test]
    fn test_empty_string_is_text() {
        let ordered = order_values(strings(&["", "5"]));
        assert_eq!(ordered, strings(&["5", ""]));
    }

    fn option_value() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u32..5000).prop_map(|n| n.to_string()),
            (0u32..100, 1u32..10).prop_map(|(a, b)| format!("{}.{}", a, b)),
            "[A-Za-z][A-Za-z0-9 ]{0,8}",
        ]
    }

    proptest! {
        #[test]
        fn prop_numerics_first_then_text(values in proptest::collection::vec(option_value(), 0..40)) {
            let ordered = order_values(values);
            let first_text = ordered
                .iter()
                .position(|v| parse_numeric(v).is_none())
                .unwrap_or(ordered.len());

            let (numeric, text) = ordered.split_at(first_text);
            prop_assert!(text.iter().all(|v| parse_numeric(v).is_none()));

            let parsed: Vec<f64> = numeric.iter().filter_map(|v| parse_numeric(v)).collect();
            prop_assert_eq!(parsed.len(), numeric.len());
            prop_assert!(parsed.windows(2).all(|w| w[0] <= w[1]));
            prop_assert!(text.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn prop_idempotent(values in proptest::collection::vec(option_value(), 0..40)) {
            let once = order_values(values);
            let twice = order_values(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_independent_of_discovery_order(values in proptest::collection::vec(option_value(), 0..40)) {
            let mut reversed = values.clone();
            reversed.reverse();
            prop_assert_eq!(order_values(values), order_values(reversed));
        }
    }
}
