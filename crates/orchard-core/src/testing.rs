//! Variant fixtures for unit tests.

use chrono::Utc;

use crate::dimension::DimensionValue;
use crate::types::{DeviceSpec, Variant};

fn variant(model: &str, storage: DimensionValue, color: &str, price_cents: i64, spec: DeviceSpec) -> Variant {
    let now = Utc::now();
    Variant {
        id: uuid::Uuid::new_v4().to_string(),
        model: model.to_string(),
        price_cents,
        image: None,
        condition: "New".to_string(),
        battery: "100".to_string(),
        color: color.to_string(),
        storage,
        spec,
        created_at: now,
        updated_at: now,
    }
}

/// A new phone with 100% battery.
pub fn phone(model: &str, storage: u32, color: &str, price_cents: i64) -> Variant {
    variant(model, DimensionValue::from(storage), color, price_cents, DeviceSpec::Phone)
}

/// A new 256 GB silver laptop.
pub fn laptop(model: &str, cpu: &str, ram: u32, price_cents: i64) -> Variant {
    variant(
        model,
        DimensionValue::from(256u32),
        "Silver",
        price_cents,
        DeviceSpec::Laptop {
            cpu: cpu.to_string(),
            ram,
        },
    )
}

/// A new 64 GB space gray tablet.
pub fn tablet(model: &str, connectivity: &str, price_cents: i64) -> Variant {
    variant(
        model,
        DimensionValue::from(64u32),
        "Space Gray",
        price_cents,
        DeviceSpec::Tablet {
            connectivity: connectivity.to_string(),
        },
    )
}
