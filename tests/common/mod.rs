//! In-memory implementations of the ports, shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};

use pharmacy_supply::config::PricingConfig;
use pharmacy_supply::domain::contract::{Contract, ContractId, NewContract};
use pharmacy_supply::domain::errors::DomainError;
use pharmacy_supply::domain::order::{
    CartLine, OrderFilter, OrderId, OrderItem, OrderStatus, PharmacyOrder, Product, ProductId,
};
use pharmacy_supply::domain::ports::{
    ContractRepository, PharmacyOrderRepository, ProductCatalog, SupplierOrderRepository,
};
use pharmacy_supply::domain::session::{Role, Session};
use pharmacy_supply::domain::supplier::{
    SupplierOrder, SupplierOrderId, SupplierOrderItem, SupplierOrderStatus,
};
use pharmacy_supply::AppState;

pub fn dec(v: &str) -> BigDecimal {
    BigDecimal::from_str(v).expect("valid decimal")
}

pub fn pharmacy(user: &str) -> Session {
    Session::new(user, Role::Pharmacy)
}

pub fn warehouse() -> Session {
    Session::new("central", Role::Warehouse)
}

fn unavailable() -> DomainError {
    DomainError::Internal("database unavailable".to_string())
}

// ── Catalogue ────────────────────────────────────────────────────────────────

pub struct InMemoryCatalog {
    products: Mutex<Vec<Product>>,
}

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    pub fn stock_of(&self, id: ProductId) -> i32 {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.stock_qty)
            .unwrap_or(0)
    }

    pub fn set_stock(&self, id: ProductId, qty: i32) {
        if let Some(p) = self.products.lock().unwrap().iter_mut().find(|p| p.id == id) {
            p.stock_qty = qty;
        }
    }

    fn product(&self, id: ProductId) -> Option<Product> {
        self.products
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Takes up to `wanted` units out of stock and returns how many were taken.
    fn take(&self, id: ProductId, wanted: i32) -> i32 {
        let mut products = self.products.lock().unwrap();
        match products.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                let taken = wanted.min(p.stock_qty.max(0));
                p.stock_qty -= taken;
                taken
            }
            None => 0,
        }
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn fetch_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut products = self.products.lock().unwrap().clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    fn fetch_available_counts(
        &self,
        product_ids: &[ProductId],
    ) -> Result<HashMap<ProductId, i32>, DomainError> {
        Ok(self
            .products
            .lock()
            .unwrap()
            .iter()
            .filter(|p| product_ids.contains(&p.id))
            .map(|p| (p.id, p.stock_qty))
            .collect())
    }
}

// ── Pharmacy orders ──────────────────────────────────────────────────────────

pub struct InMemoryOrders {
    catalog: Arc<InMemoryCatalog>,
    orders: Mutex<Vec<PharmacyOrder>>,
    pub fail_writes: AtomicBool,
    pub fail_status_updates: AtomicBool,
}

impl InMemoryOrders {
    pub fn new(catalog: Arc<InMemoryCatalog>) -> Self {
        Self {
            catalog,
            orders: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            fail_status_updates: AtomicBool::new(false),
        }
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// Moves an order's execution time into the past.
    pub fn backdate(&self, id: OrderId, executed_at: DateTime<Utc>) {
        if let Some(o) = self.orders.lock().unwrap().iter_mut().find(|o| o.id == id) {
            o.executed_at = executed_at;
        }
    }

    fn with_current_stock(&self, mut order: PharmacyOrder) -> PharmacyOrder {
        for item in &mut order.items {
            item.available_qty = self.catalog.stock_of(item.product_id);
        }
        order
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

impl PharmacyOrderRepository for InMemoryOrders {
    fn create_order(
        &self,
        pharmacy: &str,
        lines: &[CartLine],
        total: &BigDecimal,
    ) -> Result<OrderId, DomainError> {
        self.check_writable()?;
        let mut orders = self.orders.lock().unwrap();
        let id = orders.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        let items = lines
            .iter()
            .map(|l| OrderItem {
                product_id: l.product_id,
                name: self
                    .catalog
                    .product(l.product_id)
                    .map(|p| p.name)
                    .unwrap_or_default(),
                requested_qty: l.quantity,
                available_qty: 0,
                shipped_qty: 0,
                unit_price: l.unit_price.clone(),
            })
            .collect();
        orders.push(PharmacyOrder {
            id,
            pharmacy: pharmacy.to_string(),
            status: OrderStatus::Pending,
            total_cost: total.clone(),
            executed_at: Utc::now(),
            shipment_at: None,
            items,
        });
        Ok(id)
    }

    fn find_by_id(&self, id: OrderId) -> Result<Option<PharmacyOrder>, DomainError> {
        let order = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned();
        Ok(order.map(|o| self.with_current_stock(o)))
    }

    fn list(&self, filter: &OrderFilter) -> Result<Vec<PharmacyOrder>, DomainError> {
        let mut orders: Vec<PharmacyOrder> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| filter.pharmacy.as_deref().map_or(true, |p| o.pharmacy == p))
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(orders.into_iter().map(|o| self.with_current_stock(o)).collect())
    }

    fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), DomainError> {
        self.check_writable()?;
        if self.fail_status_updates.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Order #{id}")))?;
        if order.status != from {
            return Err(DomainError::InvalidTransition {
                from: order.status,
                to,
            });
        }
        order.status = from.transition_to(to)?;
        Ok(())
    }

    fn ship(&self, id: OrderId, shipped_at: DateTime<Utc>) -> Result<i64, DomainError> {
        self.check_writable()?;
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Order #{id}")))?;
        order.status.transition_to(OrderStatus::Shipped)?;
        let mut shipped = 0i64;
        for item in &mut order.items {
            item.shipped_qty = self.catalog.take(item.product_id, item.requested_qty);
            shipped += i64::from(item.shipped_qty);
        }
        order.status = OrderStatus::Shipped;
        order.shipment_at = Some(shipped_at);
        Ok(shipped)
    }
}

// ── Contracts ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryContracts {
    contracts: Mutex<Vec<Contract>>,
}

impl InMemoryContracts {
    /// Stores an already-signed contract, bypassing the signing rules.
    pub fn insert(&self, pharmacy: &str, months: u32, percent: &str, signed_at: DateTime<Utc>) {
        let mut contracts = self.contracts.lock().unwrap();
        let id = contracts.len() as ContractId + 1;
        contracts.push(Contract {
            id,
            pharmacy: pharmacy.to_string(),
            duration_months: months,
            discount_percent: dec(percent),
            frequency: "weekly".to_string(),
            payment: "invoice".to_string(),
            signed_at,
            expires_at: signed_at + Duration::days(30 * i64::from(months)),
            is_active: true,
        });
    }
}

impl ContractRepository for InMemoryContracts {
    fn fetch_contracts(&self, pharmacy: &str) -> Result<Vec<Contract>, DomainError> {
        let mut contracts: Vec<Contract> = self
            .contracts
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.pharmacy == pharmacy)
            .cloned()
            .collect();
        contracts.sort_by(|a, b| b.signed_at.cmp(&a.signed_at));
        Ok(contracts)
    }

    fn create(&self, contract: NewContract) -> Result<ContractId, DomainError> {
        let mut contracts = self.contracts.lock().unwrap();
        let id = contracts.len() as ContractId + 1;
        contracts.push(Contract {
            id,
            pharmacy: contract.pharmacy,
            duration_months: contract.duration_months,
            discount_percent: contract.discount_percent,
            frequency: contract.frequency,
            payment: contract.payment,
            signed_at: contract.signed_at,
            expires_at: contract.expires_at,
            is_active: true,
        });
        Ok(id)
    }

    fn deactivate(&self, id: ContractId) -> Result<(), DomainError> {
        let mut contracts = self.contracts.lock().unwrap();
        let contract = contracts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("Contract {id}")))?;
        contract.is_active = false;
        Ok(())
    }
}

// ── Supplier orders ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySupplierOrders {
    orders: Mutex<Vec<SupplierOrder>>,
}

impl InMemorySupplierOrders {
    pub fn all(&self) -> Vec<SupplierOrder> {
        self.orders.lock().unwrap().clone()
    }
}

impl SupplierOrderRepository for InMemorySupplierOrders {
    fn create(
        &self,
        items: &[SupplierOrderItem],
        total: &BigDecimal,
    ) -> Result<SupplierOrderId, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let id = orders.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        orders.insert(
            0,
            SupplierOrder {
                id,
                created_at: Utc::now(),
                status: SupplierOrderStatus::InProgress,
                total_cost: total.clone(),
                items: items.to_vec(),
            },
        );
        Ok(id)
    }

    fn find_by_id(&self, id: SupplierOrderId) -> Result<Option<SupplierOrder>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned())
    }

    fn list(&self, status: Option<SupplierOrderStatus>) -> Result<Vec<SupplierOrder>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: SupplierOrderId,
        status: SupplierOrderStatus,
    ) -> Result<Option<SupplierOrder>, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        Ok(orders.iter_mut().find(|o| o.id == id).map(|o| {
            let previous = o.clone();
            o.status = status;
            previous
        }))
    }
}

// ── Wiring ───────────────────────────────────────────────────────────────────

fn product(id: ProductId, name: &str, price: &str, stock_qty: i32) -> Product {
    Product {
        id,
        name: name.to_string(),
        category: "otc".to_string(),
        company: "Acme Pharma".to_string(),
        unit_price: dec(price),
        stock_qty,
    }
}

/// Product 1: 2.50, 4 in stock. Product 2: 10.00, 20 in stock.
/// Product 3: 5.00, out of stock.
pub fn seed_products() -> Vec<Product> {
    vec![
        product(1, "Depon 500mg", "2.50", 4),
        product(2, "Augmentin 1g", "10.00", 20),
        product(3, "Zirtek 10mg", "5.00", 0),
    ]
}

pub struct TestWorld {
    pub catalog: Arc<InMemoryCatalog>,
    pub orders: Arc<InMemoryOrders>,
    pub contracts: Arc<InMemoryContracts>,
    pub supplier_orders: Arc<InMemorySupplierOrders>,
    pub pricing: PricingConfig,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_pricing(PricingConfig::default())
    }

    pub fn with_pricing(pricing: PricingConfig) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new(seed_products()));
        Self {
            orders: Arc::new(InMemoryOrders::new(catalog.clone())),
            catalog,
            contracts: Arc::new(InMemoryContracts::default()),
            supplier_orders: Arc::new(InMemorySupplierOrders::default()),
            pricing,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            catalog: self.catalog.clone(),
            orders: self.orders.clone(),
            contracts: self.contracts.clone(),
            supplier_orders: self.supplier_orders.clone(),
            pricing: self.pricing.clone(),
        }
    }

    /// Gives `pharmacy` a contract in force with the given discount.
    pub fn with_contract(self, pharmacy: &str, percent: &str) -> Self {
        self.contracts
            .insert(pharmacy, 12, percent, Utc::now() - Duration::days(1));
        self
    }
}
