//! # Lowest-Price Selector
//!
//! Picks one representative variant per model: the cheapest one.
//!
//! ```text
//! all variants ──► stable sort by price ──► first per model ──► sort by
//!                                                               (device_type, price)
//!                                                                    │
//!                                     ┌──────────────┬───────────────┼──────────────┐
//!                                     ▼              ▼               ▼              ▼
//!                                    all           phones         laptops        tablets
//! ```
//!
//! The minimum is guaranteed by construction: after the price sort the
//! first member of each model group is its cheapest. Ties go to whichever
//! variant came first in the input.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::types::{DeviceType, Variant};

/// Lowest-price variant of every model, in presentation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LowestPriceCatalog {
    /// Every representative, sorted by device type then price.
    pub all: Vec<Variant>,
    pub phones: Vec<Variant>,
    pub laptops: Vec<Variant>,
    pub tablets: Vec<Variant>,
}

impl LowestPriceCatalog {
    /// Number of distinct models represented.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Returns the bucket for one device type.
    pub fn bucket(&self, device_type: DeviceType) -> &[Variant] {
        match device_type {
            DeviceType::Phone => &self.phones,
            DeviceType::Laptop => &self.laptops,
            DeviceType::Tablet => &self.tablets,
        }
    }
}

/// Selects the cheapest variant of every model.
pub fn select_lowest_price(variants: Vec<Variant>) -> LowestPriceCatalog {
    let mut by_price = variants;
    // sort_by_key is stable
    by_price.sort_by_key(|v| v.price_cents);

    let mut seen = HashSet::new();
    let mut all: Vec<Variant> = by_price
        .into_iter()
        .filter(|v| seen.insert(v.model.clone()))
        .collect();
    // DeviceType order (phone, laptop, tablet), not the alphabetical order of
    // the legacy type names, which would put iPad first and MacBook last
    all.sort_by_key(|v| (v.device_type(), v.price_cents));

    let pick = |device_type: DeviceType| -> Vec<Variant> {
        all.iter()
            .filter(|v| v.device_type() == device_type)
            .cloned()
            .collect()
    };

    LowestPriceCatalog {
        phones: pick(DeviceType::Phone),
        laptops: pick(DeviceType::Laptop),
        tablets: pick(DeviceType::Tablet),
        all,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{laptop, phone, tablet};
    use proptest::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_cheapest_per_model() {
        let variants = vec![
            phone("A", 128, "Black", 500),
            phone("A", 128, "White", 300),
            phone("B", 128, "Black", 700),
        ];

        let catalog = select_lowest_price(variants);

        let picked: Vec<(&str, i64)> = catalog
            .all
            .iter()
            .map(|v| (v.model.as_str(), v.price_cents))
            .collect();
        assert_eq!(picked, vec![("A", 300), ("B", 700)]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let first = phone("A", 128, "Black", 300);
        let second = phone("A", 256, "White", 300);
        let first_id = first.id.clone();

        let catalog = select_lowest_price(vec![first, second]);

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.all[0].id, first_id);
    }

    #[test]
    fn test_partitioned_in_presentation_order() {
        let variants = vec![
            tablet("Air", "WiFi", 200),
            laptop("X1", "M1", 8, 100),
            phone("13", 128, "Blue", 900),
            phone("12", 128, "Blue", 400),
        ];

        let catalog = select_lowest_price(variants);

        let models: Vec<&str> = catalog.all.iter().map(|v| v.model.as_str()).collect();
        assert_eq!(models, vec!["12", "13", "X1", "Air"]);
        assert_eq!(catalog.phones.len(), 2);
        assert_eq!(catalog.bucket(DeviceType::Laptop)[0].model, "X1");
        assert_eq!(catalog.tablets.len(), 1);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = select_lowest_price(Vec::new());
        assert!(catalog.is_empty());
        assert!(catalog.phones.is_empty());
    }

    proptest! {
        #[test]
        fn prop_selects_minimum_of_every_model(
            entries in proptest::collection::vec((0usize..6, 0i64..10_000), 0..60)
        ) {
            let variants: Vec<Variant> = entries
                .iter()
                .map(|(m, price)| phone(&format!("model-{}", m), 128, "Black", *price))
                .collect();

            let mut expected: HashMap<String, i64> = HashMap::new();
            for v in &variants {
                let entry = expected.entry(v.model.clone()).or_insert(v.price_cents);
                *entry = (*entry).min(v.price_cents);
            }

            let catalog = select_lowest_price(variants);

            prop_assert_eq!(catalog.len(), expected.len());
            for v in &catalog.all {
                prop_assert_eq!(Some(&v.price_cents), expected.get(&v.model));
            }
        }
    }
}
