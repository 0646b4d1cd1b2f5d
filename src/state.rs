use std::sync::Arc;

use crate::application::cart::Cart;
use crate::application::checkout::PharmacyCheckout;
use crate::application::contracts::ContractService;
use crate::application::fulfillment::FulfillmentService;
use crate::application::history::HistoryService;
use crate::application::supply::WarehouseSupply;
use crate::config::PricingConfig;
use crate::db::DbPool;
use crate::domain::ports::{
    ContractRepository, PharmacyOrderRepository, ProductCatalog, SupplierOrderRepository,
};
use crate::infrastructure::catalog_repo::DieselProductCatalog;
use crate::infrastructure::contract_repo::DieselContractRepository;
use crate::infrastructure::order_repo::DieselOrderRepository;
use crate::infrastructure::supplier_store::JsonSupplierOrderStore;

/// Collaborators and rules shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn ProductCatalog>,
    pub orders: Arc<dyn PharmacyOrderRepository>,
    pub contracts: Arc<dyn ContractRepository>,
    pub supplier_orders: Arc<dyn SupplierOrderRepository>,
    pub pricing: PricingConfig,
}

impl AppState {
    /// Postgres for products, orders and contracts; the JSON file for supplier orders.
    pub fn from_pool(
        pool: DbPool,
        supplier_orders: JsonSupplierOrderStore,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            catalog: Arc::new(DieselProductCatalog::new(pool.clone())),
            orders: Arc::new(DieselOrderRepository::new(pool.clone())),
            contracts: Arc::new(DieselContractRepository::new(pool)),
            supplier_orders: Arc::new(supplier_orders),
            pricing,
        }
    }

    pub fn contract_service(&self) -> ContractService {
        ContractService::new(self.contracts.clone(), self.pricing.discount_table.clone())
    }

    pub fn pharmacy_cart(&self) -> Cart<PharmacyCheckout> {
        let checkout = PharmacyCheckout::new(
            self.catalog.clone(),
            self.orders.clone(),
            self.contract_service(),
            self.pricing.delivery,
        );
        Cart::new(checkout, self.pricing.pharmacy_cart.clone())
    }

    pub fn supply_cart(&self) -> Cart<WarehouseSupply> {
        let supply = WarehouseSupply::new(self.catalog.clone(), self.supplier_orders.clone());
        Cart::new(supply, self.pricing.supply_cart.clone())
    }

    pub fn fulfillment(&self) -> FulfillmentService {
        FulfillmentService::new(self.orders.clone(), self.supplier_orders.clone())
    }

    pub fn history(&self) -> HistoryService {
        HistoryService::new(self.orders.clone(), self.pricing.delivery)
    }
}
