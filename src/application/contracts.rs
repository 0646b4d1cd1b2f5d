use std::sync::Arc;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};

use crate::domain::contract::{
    discount_for_label, duration_months_for_label, expiry_for, Contract, NewContract,
    DURATION_CHOICES,
};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContractRepository;
use crate::domain::pricing::DiscountTable;
use crate::domain::session::{Role, Session};

#[derive(Debug, Clone)]
pub struct SignContract {
    pub duration_label: String,
    pub frequency: String,
    pub payment: String,
}

#[derive(Clone)]
pub struct ContractService {
    repo: Arc<dyn ContractRepository>,
    table: DiscountTable,
}

impl ContractService {
    pub fn new(repo: Arc<dyn ContractRepository>, table: DiscountTable) -> Self {
        Self { repo, table }
    }

    pub fn active_contract(
        &self,
        pharmacy: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Contract>, DomainError> {
        Ok(self
            .repo
            .fetch_contracts(pharmacy)?
            .into_iter()
            .find(|c| c.is_in_force(now)))
    }

    pub fn active_discount(&self, pharmacy: &str) -> Result<BigDecimal, DomainError> {
        Ok(self
            .active_contract(pharmacy, Utc::now())?
            .map(|c| c.discount_percent)
            .unwrap_or_else(BigDecimal::zero))
    }

    /// All contracts of the pharmacy, newest first.
    pub fn history(&self, pharmacy: &str) -> Result<Vec<Contract>, DomainError> {
        let mut contracts = self.repo.fetch_contracts(pharmacy)?;
        contracts.sort_by(|a, b| b.signed_at.cmp(&a.signed_at));
        Ok(contracts)
    }

    pub fn discount_hint(&self, duration_label: &str) -> BigDecimal {
        discount_for_label(duration_label, &self.table)
    }

    /// Every duration a pharmacy can sign for, with its discount.
    pub fn offers(&self) -> Vec<(&'static str, BigDecimal)> {
        DURATION_CHOICES
            .iter()
            .map(|(label, months)| (*label, self.table.discount_for(*months)))
            .collect()
    }

    pub fn sign(&self, session: &Session, request: SignContract) -> Result<Contract, DomainError> {
        session.require(Role::Pharmacy)?;
        let months = duration_months_for_label(&request.duration_label).ok_or_else(|| {
            DomainError::InvalidInput(format!(
                "unknown contract duration '{}'",
                request.duration_label
            ))
        })?;
        let frequency = request.frequency.trim();
        let payment = request.payment.trim();
        if frequency.is_empty() || payment.is_empty() {
            return Err(DomainError::InvalidInput(
                "delivery frequency and payment method are required".to_string(),
            ));
        }

        let now = Utc::now();
        if self.active_contract(&session.user, now)?.is_some() {
            return Err(DomainError::Conflict(format!(
                "pharmacy '{}' already has an active contract",
                session.user
            )));
        }

        let contract = NewContract {
            pharmacy: session.user.clone(),
            duration_months: months,
            discount_percent: self.table.discount_for(months),
            frequency: frequency.to_string(),
            payment: payment.to_string(),
            signed_at: now,
            expires_at: expiry_for(now, months),
        };
        let id = self.repo.create(contract.clone())?;
        log::info!(
            "Contract {} signed by '{}' for {} months",
            id,
            session.user,
            months
        );

        Ok(Contract {
            id,
            pharmacy: contract.pharmacy,
            duration_months: contract.duration_months,
            discount_percent: contract.discount_percent,
            frequency: contract.frequency,
            payment: contract.payment,
            signed_at: contract.signed_at,
            expires_at: contract.expires_at,
            is_active: true,
        })
    }

    pub fn cancel(&self, session: &Session) -> Result<Contract, DomainError> {
        session.require(Role::Pharmacy)?;
        let mut contract = self
            .active_contract(&session.user, Utc::now())?
            .ok_or_else(|| DomainError::NotFound("Active contract".to_string()))?;
        self.repo.deactivate(contract.id)?;
        log::info!("Contract {} cancelled by '{}'", contract.id, session.user);
        contract.is_active = false;
        Ok(contract)
    }
}
