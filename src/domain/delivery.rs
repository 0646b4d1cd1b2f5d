use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::errors::DomainError;
use super::order::{missing_units, CartLine, OrderItem, ProductId};

/// Delivery-time policy: a base lead time plus a fixed delay per missing
/// unit, capped at `max_days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPolicy {
    base_days: u32,
    days_per_shortage_unit: u32,
    max_days: u32,
}

impl DeliveryPolicy {
    pub fn new(
        base_days: u32,
        days_per_shortage_unit: u32,
        max_days: u32,
    ) -> Result<Self, DomainError> {
        if days_per_shortage_unit == 0 {
            return Err(DomainError::InvalidInput(
                "delivery delay per shortage unit must be positive".to_string(),
            ));
        }
        if max_days <= base_days {
            return Err(DomainError::InvalidInput(format!(
                "maximum delivery days ({max_days}) must exceed the base ({base_days})"
            )));
        }
        Ok(Self {
            base_days,
            days_per_shortage_unit,
            max_days,
        })
    }

    pub fn base_days(&self) -> u32 {
        self.base_days
    }

    pub fn days_per_shortage_unit(&self) -> u32 {
        self.days_per_shortage_unit
    }

    pub fn max_days(&self) -> u32 {
        self.max_days
    }

    /// Estimates delivery for a cart about to be submitted. Products missing
    /// from `available` count as out of stock.
    pub fn estimate(
        &self,
        lines: &[CartLine],
        available: &HashMap<ProductId, i32>,
    ) -> Result<u32, DomainError> {
        if lines.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let shortage = lines
            .iter()
            .map(|l| {
                let on_hand = available.get(&l.product_id).copied().unwrap_or(0);
                shortage_units(l.quantity, on_hand)
            })
            .sum();
        Ok(self.days_for_shortage(shortage))
    }

    /// Estimates delivery for a stored order from its requested and available counts.
    pub fn estimate_items(&self, items: &[OrderItem]) -> Result<u32, DomainError> {
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let shortage = items
            .iter()
            .map(|i| shortage_units(i.requested_qty, i.available_qty))
            .sum();
        Ok(self.days_for_shortage(shortage))
    }

    pub fn days_for_shortage(&self, shortage_units: u64) -> u32 {
        if shortage_units == 0 {
            return self.base_days;
        }
        let delay = shortage_units.saturating_mul(u64::from(self.days_per_shortage_unit));
        let days = u64::from(self.base_days).saturating_add(delay);
        days.min(u64::from(self.max_days)) as u32
    }
}

impl Default for DeliveryPolicy {
    fn default() -> Self {
        Self {
            base_days: 1,
            days_per_shortage_unit: 1,
            max_days: 14,
        }
    }
}

fn shortage_units(requested: i32, available: i32) -> u64 {
    missing_units(requested, available).unsigned_abs()
}

pub fn expected_delivery(executed_at: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    executed_at + Duration::days(i64::from(days))
}

/// Whole days until the expected delivery, never negative.
pub fn days_remaining(executed_at: DateTime<Utc>, days: u32, now: DateTime<Utc>) -> i64 {
    let left = expected_delivery(executed_at, days) - now;
    let whole = left.num_days();
    let partial = left > Duration::days(whole);
    (whole + i64::from(partial)).max(0)
}
