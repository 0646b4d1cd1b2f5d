use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::order::{CartLine, ProductId};

pub type SupplierOrderId = i32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SupplierOrderStatus {
    InProgress,
    Completed,
}

impl SupplierOrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SupplierOrderStatus::InProgress => "in-progress",
            SupplierOrderStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for SupplierOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SupplierOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in-progress" | "in_progress" => Ok(SupplierOrderStatus::InProgress),
            "completed" => Ok(SupplierOrderStatus::Completed),
            other => Err(DomainError::InvalidInput(format!(
                "unknown supplier order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl SupplierOrderItem {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub id: SupplierOrderId,
    pub created_at: DateTime<Utc>,
    pub status: SupplierOrderStatus,
    pub total_cost: BigDecimal,
    pub items: Vec<SupplierOrderItem>,
}

impl SupplierOrder {
    pub fn display_ref(&self) -> String {
        supplier_ref(self.id)
    }
}

pub fn supplier_ref(id: SupplierOrderId) -> String {
    format!("SUP-{id}")
}

/// Builds supplier order lines, silently dropping lines without a positive
/// quantity and price.
pub fn supplier_items(lines: &[CartLine]) -> Vec<SupplierOrderItem> {
    lines
        .iter()
        .filter(|l| l.is_billable())
        .map(|l| SupplierOrderItem {
            product_id: l.product_id,
            quantity: l.quantity,
            unit_price: l.unit_price.clone(),
        })
        .collect()
}

pub fn supplier_total(items: &[SupplierOrderItem]) -> BigDecimal {
    items
        .iter()
        .fold(BigDecimal::zero(), |acc, i| acc + i.line_total())
}

/// Parses `#SUP-4`, `SUP-4`, `#4` or `4`.
pub fn parse_supplier_ref(raw: &str) -> Option<SupplierOrderId> {
    let trimmed = raw.trim().trim_start_matches('#');
    let digits = trimmed
        .strip_prefix("SUP-")
        .or_else(|| trimmed.strip_prefix("sup-"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
