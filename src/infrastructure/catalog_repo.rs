use std::collections::HashMap;

use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{Product, ProductId};
use crate::domain::ports::ProductCatalog;
use crate::schema::products;

use super::models::ProductRow;

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            category: row.category,
            company: row.company,
            unit_price: row.unit_price,
            stock_qty: row.stock_qty,
        }
    }
}

pub struct DieselProductCatalog {
    pool: DbPool,
}

impl DieselProductCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductCatalog for DieselProductCatalog {
    fn fetch_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .order(products::name.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn fetch_available_counts(
        &self,
        product_ids: &[ProductId],
    ) -> Result<HashMap<ProductId, i32>, DomainError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get()?;

        let rows: Vec<(i32, i32)> = products::table
            .filter(products::id.eq_any(product_ids.to_vec()))
            .select((products::id, products::stock_qty))
            .load(&mut conn)?;

        Ok(rows.into_iter().collect())
    }
}
