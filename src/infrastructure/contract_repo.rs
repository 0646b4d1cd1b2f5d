use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::contract::{Contract, ContractId, NewContract};
use crate::domain::errors::DomainError;
use crate::domain::ports::ContractRepository;
use crate::schema::contracts;

use super::models::{ContractRow, NewContractRow};

impl From<ContractRow> for Contract {
    fn from(row: ContractRow) -> Self {
        Contract {
            id: row.id,
            pharmacy: row.pharmacy,
            duration_months: u32::try_from(row.duration_months).unwrap_or(0),
            discount_percent: row.discount_percent,
            frequency: row.frequency,
            payment: row.payment,
            signed_at: row.signed_at,
            expires_at: row.expires_at,
            is_active: row.is_active,
        }
    }
}

pub struct DieselContractRepository {
    pool: DbPool,
}

impl DieselContractRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ContractRepository for DieselContractRepository {
    fn fetch_contracts(&self, pharmacy: &str) -> Result<Vec<Contract>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = contracts::table
            .filter(contracts::pharmacy.eq(pharmacy))
            .order(contracts::signed_at.desc())
            .select(ContractRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Contract::from).collect())
    }

    fn create(&self, contract: NewContract) -> Result<ContractId, DomainError> {
        let duration_months = i32::try_from(contract.duration_months).map_err(|_| {
            DomainError::InvalidInput(format!(
                "contract duration of {} months is out of range",
                contract.duration_months
            ))
        })?;
        let mut conn = self.pool.get()?;

        let id = diesel::insert_into(contracts::table)
            .values(&NewContractRow {
                pharmacy: contract.pharmacy,
                duration_months,
                discount_percent: contract.discount_percent,
                frequency: contract.frequency,
                payment: contract.payment,
                signed_at: contract.signed_at,
                expires_at: contract.expires_at,
                is_active: true,
            })
            .returning(contracts::id)
            .get_result(&mut conn)?;
        Ok(id)
    }

    fn deactivate(&self, id: ContractId) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        let updated = diesel::update(contracts::table.find(id))
            .set(contracts::is_active.eq(false))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound(format!("Contract {id}")));
        }
        Ok(())
    }
}
