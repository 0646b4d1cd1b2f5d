use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::contract::{Contract, ContractId, NewContract};
use super::errors::DomainError;
use super::order::{CartLine, OrderFilter, OrderId, OrderStatus, PharmacyOrder, Product, ProductId};
use super::supplier::{SupplierOrder, SupplierOrderId, SupplierOrderItem, SupplierOrderStatus};

pub trait ProductCatalog: Send + Sync + 'static {
    fn fetch_products(&self) -> Result<Vec<Product>, DomainError>;
    fn fetch_available_counts(
        &self,
        product_ids: &[ProductId],
    ) -> Result<HashMap<ProductId, i32>, DomainError>;
}

pub trait PharmacyOrderRepository: Send + Sync + 'static {
    fn create_order(
        &self,
        pharmacy: &str,
        lines: &[CartLine],
        total: &BigDecimal,
    ) -> Result<OrderId, DomainError>;
    fn find_by_id(&self, id: OrderId) -> Result<Option<PharmacyOrder>, DomainError>;
    fn list(&self, filter: &OrderFilter) -> Result<Vec<PharmacyOrder>, DomainError>;
    /// Moves the order from `from` to `to`. Fails with `InvalidTransition`
    /// when the stored status is no longer `from`.
    fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), DomainError>;
    /// Marks the order shipped and takes the shipped units out of inventory.
    /// The stored status must allow shipping at the time of the write.
    /// Returns the number of units shipped.
    fn ship(&self, id: OrderId, shipped_at: DateTime<Utc>) -> Result<i64, DomainError>;
}

pub trait ContractRepository: Send + Sync + 'static {
    fn fetch_contracts(&self, pharmacy: &str) -> Result<Vec<Contract>, DomainError>;
    fn create(&self, contract: NewContract) -> Result<ContractId, DomainError>;
    fn deactivate(&self, id: ContractId) -> Result<(), DomainError>;
}

pub trait SupplierOrderRepository: Send + Sync + 'static {
    fn create(
        &self,
        items: &[SupplierOrderItem],
        total: &BigDecimal,
    ) -> Result<SupplierOrderId, DomainError>;
    fn find_by_id(&self, id: SupplierOrderId) -> Result<Option<SupplierOrder>, DomainError>;
    fn list(&self, status: Option<SupplierOrderStatus>) -> Result<Vec<SupplierOrder>, DomainError>;
    /// Sets the status and returns the order as it was before the change,
    /// or `None` when no order has the given id. Read and write happen under
    /// one lock.
    fn update_status(
        &self,
        id: SupplierOrderId,
        status: SupplierOrderStatus,
    ) -> Result<Option<SupplierOrder>, DomainError>;
}
