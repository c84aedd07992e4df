//! # Order Configuration Validator
//!
//! Cross-checks every line of an order against the authoritative variant
//! record and computes the order total. Nothing here touches the store: the
//! caller fetches the referenced variants, builds a draft, and only writes
//! it when every line passed.
//!
//! ## Line Checks
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. variant exists                       else NotFound                  │
//! │  2. condition, storage, color present    else Required                  │
//! │  3. condition, storage, color agree      else InvalidConfiguration      │
//! │  4. laptop: cpu / ram agree if supplied                                 │
//! │  5. tablet: connectivity agrees if supplied                             │
//! │  6. quantity ≥ 1, price ≥ 0                                             │
//! │                                                                         │
//! │  total = Σ price_at_purchase × quantity                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The snapshot stored on each line takes device-specific values from the
//! variant, so a laptop line always records its cpu and ram even when the
//! request left them out. Fields that do not apply to the device are
//! dropped.

use serde::{Deserialize, Serialize};

use crate::dimension::Dimension;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{
    DeviceSpec, LineConfiguration, Order, OrderItem, OrderLineRequest, OrderStatus, Variant,
};
use crate::validation::{validate_price_cents, validate_quantity};

// =============================================================================
// Line Validation
// =============================================================================

/// Validates one order line against its variant and snapshots it.
pub fn validate_line(variant: &Variant, request: &OrderLineRequest) -> CoreResult<OrderItem> {
    let requested = &request.configuration;

    let condition = requested
        .condition
        .as_deref()
        .ok_or_else(|| ValidationError::required("configuration.condition"))?;
    let storage = requested
        .storage
        .as_ref()
        .ok_or_else(|| ValidationError::required("configuration.storage"))?;
    let color = requested
        .color
        .as_deref()
        .ok_or_else(|| ValidationError::required("configuration.color"))?;

    if condition != variant.condition {
        return Err(CoreError::mismatch(Dimension::Condition, condition, &variant.condition));
    }
    if *storage != variant.storage {
        return Err(CoreError::mismatch(Dimension::Storage, storage, &variant.storage));
    }
    if color != variant.color {
        return Err(CoreError::mismatch(Dimension::Color, color, &variant.color));
    }

    let mut snapshot = LineConfiguration {
        condition: variant.condition.clone(),
        storage: variant.storage.clone(),
        color: variant.color.clone(),
        cpu: None,
        ram: None,
        connectivity: None,
    };

    match &variant.spec {
        DeviceSpec::Phone => {}
        DeviceSpec::Laptop { cpu, ram } => {
            if let Some(wanted) = requested.cpu.as_deref() {
                if wanted != cpu {
                    return Err(CoreError::mismatch(Dimension::Cpu, wanted, cpu));
                }
            }
            if let Some(wanted) = requested.ram {
                if wanted != *ram {
                    return Err(CoreError::mismatch(Dimension::Ram, wanted, ram));
                }
            }
            snapshot.cpu = Some(cpu.clone());
            snapshot.ram = Some(*ram);
        }
        DeviceSpec::Tablet { connectivity } => {
            if let Some(wanted) = requested.connectivity.as_deref() {
                if wanted != connectivity {
                    return Err(CoreError::mismatch(
                        Dimension::Connectivity,
                        wanted,
                        connectivity,
                    ));
                }
            }
            snapshot.connectivity = Some(connectivity.clone());
        }
    }

    validate_quantity(request.quantity)?;
    validate_price_cents("price_at_purchase_cents", request.price_at_purchase_cents)?;

    Ok(OrderItem {
        variant_id: variant.id.clone(),
        configuration: snapshot,
        quantity: request.quantity,
        price_at_purchase_cents: request.price_at_purchase_cents,
    })
}

// =============================================================================
// Order Draft
// =============================================================================

/// A fully validated order, ready to be written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub items: Vec<OrderItem>,
    pub total: Money,
}

/// Validates every line of an order before anything is persisted.
///
/// `lookup` resolves a variant id to the stored record. The first failing
/// line rejects the whole order.
pub fn build_order<'a, F>(requests: &[OrderLineRequest], lookup: F) -> CoreResult<OrderDraft>
where
    F: Fn(&str) -> Option<&'a Variant>,
{
    if requests.is_empty() {
        return Err(ValidationError::required("items").into());
    }

    let mut items = Vec::with_capacity(requests.len());
    let mut total = Money::zero();

    for (index, request) in requests.iter().enumerate() {
        let variant = lookup(&request.variant_id)
            .ok_or_else(|| CoreError::not_found("Variant", &request.variant_id))?;

        let item = validate_line(variant, request).map_err(|e| match e {
            CoreError::Validation(v) => CoreError::Validation(v.at(index)),
            other => other,
        })?;

        total = Money::from_cents(item.price_at_purchase_cents)
            .checked_line_total(item.quantity)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "total".to_string(),
                min: 0,
                max: i64::MAX,
            })?;
        items.push(item);
    }

    Ok(OrderDraft { items, total })
}

// =============================================================================
// Status Changes
// =============================================================================

/// What a status change does to the owning user's order pointers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerUpdate {
    /// Keep pointing at the order with its new status.
    Refresh(OrderStatus),
    /// Append the order to purchase history and clear the pointer.
    MoveToHistory,
    /// Clear the pointer.
    Clear,
}

/// Checks a status change and returns its effect on the user record.
///
/// Delivered and cancelled orders are final.
pub fn plan_status_change(order: &Order, next: OrderStatus) -> CoreResult<PointerUpdate> {
    if order.status.is_terminal() {
        return Err(CoreError::InvalidStatusTransition {
            order_id: order.id.clone(),
            from: order.status,
            to: next,
        });
    }

    Ok(match next {
        OrderStatus::Delivered => PointerUpdate::MoveToHistory,
        OrderStatus::Cancelled => PointerUpdate::Clear,
        other => PointerUpdate::Refresh(other),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
