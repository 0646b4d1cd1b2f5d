use bigdecimal::{BigDecimal, Zero};

use super::errors::DomainError;
use super::order::CartLine;

#[derive(Debug, Clone, PartialEq)]
pub struct ContractTerm {
    pub duration_months: u32,
    pub discount_percent: BigDecimal,
}

impl ContractTerm {
    pub fn new(duration_months: u32, discount_percent: BigDecimal) -> Self {
        Self {
            duration_months,
            discount_percent,
        }
    }
}

/// Step-function lookup from contract length to discount percent.
///
/// Terms are kept sorted by duration and the percent never decreases as the
/// duration grows.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountTable {
    terms: Vec<ContractTerm>,
}

impl DiscountTable {
    pub fn new(mut terms: Vec<ContractTerm>) -> Result<Self, DomainError> {
        terms.sort_by_key(|t| t.duration_months);
        for term in &terms {
            if term.duration_months == 0 {
                return Err(DomainError::InvalidInput(
                    "contract term duration must be positive".to_string(),
                ));
            }
            if term.discount_percent < BigDecimal::zero() {
                return Err(DomainError::InvalidInput(format!(
                    "discount for {} months is negative",
                    term.duration_months
                )));
            }
        }
        for pair in terms.windows(2) {
            if pair[0].duration_months == pair[1].duration_months {
                return Err(DomainError::InvalidInput(format!(
                    "duplicate contract term of {} months",
                    pair[0].duration_months
                )));
            }
            if pair[1].discount_percent < pair[0].discount_percent {
                return Err(DomainError::InvalidInput(format!(
                    "discount for {} months is lower than for {} months",
                    pair[1].duration_months, pair[0].duration_months
                )));
            }
        }
        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[ContractTerm] {
        &self.terms
    }

    /// Percent of the highest threshold not above `duration_months`, or zero.
    pub fn discount_for(&self, duration_months: u32) -> BigDecimal {
        self.terms
            .iter()
            .rev()
            .find(|t| t.duration_months <= duration_months)
            .map(|t| t.discount_percent.clone())
            .unwrap_or_else(BigDecimal::zero)
    }
}

impl Default for DiscountTable {
    fn default() -> Self {
        Self {
            terms: vec![
                ContractTerm::new(6, BigDecimal::from(5)),
                ContractTerm::new(12, BigDecimal::from(10)),
                ContractTerm::new(24, BigDecimal::from(15)),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTotals {
    pub base_total: BigDecimal,
    pub discount_percent: BigDecimal,
    pub discount_amount: BigDecimal,
    pub final_total: BigDecimal,
}

/// Applies a percentage discount to the billable lines of a cart.
///
/// No rounding happens here; see [`format_money`].
pub fn compute_totals(lines: &[CartLine], discount_percent: &BigDecimal) -> OrderTotals {
    let zero = BigDecimal::zero();
    let base_total = lines
        .iter()
        .filter(|l| l.is_billable())
        .fold(BigDecimal::zero(), |acc, l| acc + l.line_total());

    let percent = if *discount_percent < zero {
        zero.clone()
    } else {
        discount_percent.clone()
    };
    let factor = BigDecimal::from(1) - &percent / BigDecimal::from(100);
    let mut final_total = &base_total * factor;
    if final_total < zero {
        final_total = zero;
    }
    let discount_amount = &base_total - &final_total;

    OrderTotals {
        base_total,
        discount_percent: percent,
        discount_amount,
        final_total,
    }
}

/// Two-decimal currency rendering, e.g. `20.00`.
pub fn format_money(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}

/// Whole-percent rendering used next to contract terms, e.g. `10%`.
pub fn format_percent(percent: &BigDecimal) -> String {
    format!("{}%", percent.round(0).with_scale(0))
}
