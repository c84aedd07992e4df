//! # Combination Enumerator
//!
//! Lists the configurations that are actually stocked for a model.
//!
//! Option lists alone over-promise: a model stocked as (256, Black) and
//! (128, White) has option lists that also admit (256, White). Only the
//! enumerated combinations say what can really be bought.
//!
//! ```text
//! variants                         combinations
//! ────────                         ────────────
//! { 256, Black, New, 100 } ──┐
//! { 256, Black, New, 100 } ──┴──►  { 256, Black, New, 100 }
//! { 256, White, New, 100 } ─────►  { 256, White, New, 100 }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::dimension::DimensionValue;
use crate::types::{DeviceType, LineConfiguration, Variant};

/// One stocked tuple of dimension values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub condition: String,
    pub storage: DimensionValue,
    pub color: String,
    pub battery: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<String>,
}

impl Combination {
    fn of(variant: &Variant) -> Self {
        Combination {
            condition: variant.condition.clone(),
            storage: variant.storage.clone(),
            color: variant.color.clone(),
            battery: variant.battery.clone(),
            cpu: variant.cpu().map(str::to_string),
            ram: variant.ram(),
            connectivity: variant.connectivity().map(str::to_string),
        }
    }

    /// Returns true if every dimension present in `config` agrees.
    ///
    /// Device-specific fields left out of `config` are not checked.
    pub fn satisfies(&self, config: &LineConfiguration) -> bool {
        fn agrees<T: PartialEq>(requested: &Option<T>, stocked: &Option<T>) -> bool {
            requested.is_none() || requested == stocked
        }

        self.condition == config.condition
            && self.storage == config.storage
            && self.color == config.color
            && agrees(&config.cpu, &self.cpu)
            && agrees(&config.ram, &self.ram)
            && agrees(&config.connectivity, &self.connectivity)
    }
}

/// The distinct stocked combinations of a model.
///
/// Order of `combinations` is not significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinationSet {
    pub device_type: DeviceType,
    pub combinations: Vec<Combination>,
}

impl CombinationSet {
    /// Number of distinct combinations.
    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// Returns true if some stocked combination agrees with `config`.
    pub fn contains(&self, config: &LineConfiguration) -> bool {
        self.combinations.iter().any(|c| c.satisfies(config))
    }
}

/// Groups `variants` of `device_type` by their full dimension tuple.
pub fn enumerate_combinations(device_type: DeviceType, variants: &[Variant]) -> CombinationSet {
    let mut seen = HashSet::new();
    let combinations = variants
        .iter()
        .filter(|v| v.device_type() == device_type)
        .map(Combination::of)
        .filter(|c| seen.insert(c.clone()))
        .collect();

    CombinationSet {
        device_type,
        combinations,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{aggregate_options, OptionFilter};
    use crate::testing::{laptop, phone, tablet};

    fn config(storage: u32, color: &str) -> LineConfiguration {
        LineConfiguration {
            condition: "New".to_string(),
            storage: DimensionValue::from(storage),
            color: color.to_string(),
            cpu: None,
            ram: None,
            connectivity: None,
        }
    }

    #[test]
    fn test_only_stocked_combinations_are_returned() {
        let variants = vec![
            phone("13", 256, "Black", 60_000),
            phone("13", 256, "White", 60_000),
        ];

        let set = enumerate_combinations(DeviceType::Phone, &variants);

        assert_eq!(set.len(), 2);
        assert!(set.contains(&config(256, "Black")));
        assert!(set.contains(&config(256, "White")));
    }

    #[test]
    fn test_not_the_cartesian_product() {
        let variants = vec![
            phone("13", 256, "Black", 60_000),
            phone("13", 128, "White", 50_000),
        ];

        let options = aggregate_options("13", DeviceType::Phone, &variants, &OptionFilter::default());
        let set = enumerate_combinations(DeviceType::Phone, &variants);

        // The option lists admit four pairs; only two exist.
        assert_eq!(options.storage.len() * options.color.len(), 4);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(&config(256, "White")));
        assert!(!set.contains(&config(128, "Black")));
    }

    #[test]
    fn test_duplicates_collapse() {
        let variants = vec![
            phone("13", 256, "Black", 60_000),
            phone("13", 256, "Black", 58_000),
        ];
        assert_eq!(enumerate_combinations(DeviceType::Phone, &variants).len(), 1);
    }

    #[test]
    fn test_laptop_tuple_includes_cpu_and_ram() {
        let variants = vec![laptop("X1", "M1", 8, 90_000), laptop("X1", "M1", 16, 110_000)];
        let set = enumerate_combinations(DeviceType::Laptop, &variants);

        assert_eq!(set.len(), 2);
        let mut partial = config(256, "Silver");
        assert!(set.contains(&partial));

        partial.cpu = Some("M1".to_string());
        partial.ram = Some(16);
        assert!(set.contains(&partial));

        partial.ram = Some(32);
        assert!(!set.contains(&partial));
    }

    #[test]
    fn test_every_combination_comes_from_a_variant() {
        let variants = vec![
            tablet("Air", "WiFi", 45_000),
            tablet("Air", "Cellular", 55_000),
            tablet("Air", "WiFi", 46_000),
        ];
        let set = enumerate_combinations(DeviceType::Tablet, &variants);

        assert_eq!(set.len(), 2);
        for combination in &set.combinations {
            assert!(variants.iter().any(|v| Combination::of(v) == *combination));
        }
    }

    #[test]
    fn test_tuple_shape_serialization() {
        let set = enumerate_combinations(DeviceType::Phone, &[phone("13", 256, "Black", 1)]);
        let json = serde_json::to_value(&set.combinations[0]).unwrap();
        assert!(json.get("cpu").is_none());
        assert_eq!(json["storage"], serde_json::json!(256));
    }
}
