use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

use super::errors::DomainError;

pub type ProductId = i32;
pub type OrderId = i32;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub company: String,
    pub unit_price: BigDecimal,
    pub stock_qty: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: BigDecimal,
}

impl CartLine {
    /// A line only counts towards totals and supplier orders when both the
    /// quantity and the price are strictly positive.
    pub fn is_billable(&self) -> bool {
        self.quantity > 0 && self.unit_price > BigDecimal::zero()
    }

    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub requested_qty: i32,
    pub available_qty: i32,
    pub shipped_qty: i32,
    pub unit_price: BigDecimal,
}

/// Units of `requested` that stock cannot cover. Negative stock counts as
/// nothing on hand.
pub fn missing_units(requested: i32, available: i32) -> i64 {
    (i64::from(requested) - i64::from(available.max(0))).max(0)
}

impl OrderItem {
    pub fn shortage(&self) -> i32 {
        i32::try_from(missing_units(self.requested_qty, self.available_qty)).unwrap_or(i32::MAX)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Shipped | OrderStatus::Cancelled)
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Shipped)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
        )
    }

    pub fn transition_to(self, next: OrderStatus) -> Result<OrderStatus, DomainError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(DomainError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(OrderStatus::Pending),
            "PROCESSING" => Ok(OrderStatus::Processing),
            "SHIPPED" => Ok(OrderStatus::Shipped),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(DomainError::InvalidInput(format!(
                "unknown order status '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PharmacyOrder {
    pub id: OrderId,
    pub pharmacy: String,
    pub status: OrderStatus,
    pub total_cost: BigDecimal,
    pub executed_at: DateTime<Utc>,
    pub shipment_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderItem>,
}

impl PharmacyOrder {
    pub fn display_ref(&self) -> String {
        format!("#{}", self.id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub pharmacy: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Parses a displayed pharmacy order reference such as `#12` or `12`.
pub fn parse_order_ref(raw: &str) -> Option<OrderId> {
    let trimmed = raw.trim().trim_start_matches('#');
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}
