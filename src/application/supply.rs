use std::sync::Arc;

use super::cart::{CartStrategy, Completion, StockStatus};
use crate::domain::errors::DomainError;
use crate::domain::order::{CartLine, Product};
use crate::domain::ports::{ProductCatalog, SupplierOrderRepository};
use crate::domain::pricing::OrderTotals;
use crate::domain::session::{Role, Session};
use crate::domain::supplier::{supplier_items, supplier_ref, supplier_total};

/// Warehouse restocking list sent straight to suppliers.
pub struct WarehouseSupply {
    catalog: Arc<dyn ProductCatalog>,
    supplier_orders: Arc<dyn SupplierOrderRepository>,
}

impl WarehouseSupply {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        supplier_orders: Arc<dyn SupplierOrderRepository>,
    ) -> Self {
        Self {
            catalog,
            supplier_orders,
        }
    }
}

impl CartStrategy for WarehouseSupply {
    fn fetch_products(&self) -> Result<Vec<Product>, DomainError> {
        self.catalog.fetch_products()
    }

    fn stock_status(&self, product: &Product) -> StockStatus {
        StockStatus {
            label: format!("In stock: {}", product.stock_qty),
            in_stock: product.stock_qty > 0,
            note: None,
        }
    }

    fn complete(
        &self,
        session: &Session,
        lines: &[CartLine],
        totals: &OrderTotals,
    ) -> Result<Completion, DomainError> {
        session.require(Role::Warehouse)?;
        let items = supplier_items(lines);
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let total = supplier_total(&items);
        let id = self.supplier_orders.create(&items, &total)?;
        let reference = supplier_ref(id);

        Ok(Completion {
            message: format!("Supplier order {reference} sent to suppliers."),
            reference,
            totals: totals.clone(),
            delivery_days: None,
        })
    }
}
