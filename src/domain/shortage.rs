use bigdecimal::BigDecimal;

use super::errors::DomainError;
use super::order::{CartLine, OrderItem, ProductId};

#[derive(Debug, Clone, PartialEq)]
pub struct ShortageLine {
    pub product_id: ProductId,
    pub shortage_qty: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShortageOutcome {
    NoShortage,
    Shortages(Vec<ShortageLine>),
}

/// Lines where the order asks for more than the warehouse holds, reduced to
/// the missing quantity.
pub fn detect_shortages(items: &[OrderItem]) -> Result<ShortageOutcome, DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyOrder);
    }
    let lines: Vec<ShortageLine> = items
        .iter()
        .filter(|i| i.shortage() > 0)
        .map(|i| ShortageLine {
            product_id: i.product_id,
            shortage_qty: i.shortage(),
            unit_price: i.unit_price.clone(),
        })
        .collect();

    if lines.is_empty() {
        Ok(ShortageOutcome::NoShortage)
    } else {
        Ok(ShortageOutcome::Shortages(lines))
    }
}

pub fn has_shortage(items: &[OrderItem]) -> bool {
    items.iter().any(|i| i.shortage() > 0)
}

impl From<ShortageLine> for CartLine {
    fn from(line: ShortageLine) -> Self {
        CartLine {
            product_id: line.product_id,
            quantity: line.shortage_qty,
            unit_price: line.unit_price,
        }
    }
}
