use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Months, Utc};

use super::pricing::DiscountTable;

pub type ContractId = i32;

/// Contract lengths offered to pharmacies, as shown to the user.
pub const DURATION_CHOICES: [(&str, u32); 3] = [("6 months", 6), ("1 year", 12), ("2 years", 24)];

#[derive(Debug, Clone, PartialEq)]
pub struct Contract {
    pub id: ContractId,
    pub pharmacy: String,
    pub duration_months: u32,
    pub discount_percent: BigDecimal,
    pub frequency: String,
    pub payment: String,
    pub signed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Contract {
    pub fn is_in_force(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now < self.expires_at
    }
}

#[derive(Debug, Clone)]
pub struct NewContract {
    pub pharmacy: String,
    pub duration_months: u32,
    pub discount_percent: BigDecimal,
    pub frequency: String,
    pub payment: String,
    pub signed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub fn duration_months_for_label(label: &str) -> Option<u32> {
    let label = label.trim();
    DURATION_CHOICES
        .iter()
        .find(|(l, _)| l.eq_ignore_ascii_case(label))
        .map(|(_, months)| *months)
}

pub fn duration_label(months: i64) -> String {
    if months <= 0 {
        return "-".to_string();
    }
    if let Some((label, _)) = DURATION_CHOICES.iter().find(|(_, m)| i64::from(*m) == months) {
        return (*label).to_string();
    }
    if months == 1 {
        "1 month".to_string()
    } else {
        format!("{months} months")
    }
}

/// Resolves a duration label through the discount table; unknown labels get no discount.
pub fn discount_for_label(label: &str, table: &DiscountTable) -> BigDecimal {
    duration_months_for_label(label)
        .map(|months| table.discount_for(months))
        .unwrap_or_else(BigDecimal::zero)
}

pub fn expiry_for(signed_at: DateTime<Utc>, duration_months: u32) -> DateTime<Utc> {
    signed_at
        .checked_add_months(Months::new(duration_months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
