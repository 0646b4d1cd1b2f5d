use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;

use super::cart::{CartStrategy, Completion, StockStatus};
use super::contracts::ContractService;
use crate::domain::delivery::DeliveryPolicy;
use crate::domain::errors::DomainError;
use crate::domain::order::{CartLine, Product, ProductId};
use crate::domain::ports::{PharmacyOrderRepository, ProductCatalog};
use crate::domain::pricing::OrderTotals;
use crate::domain::session::{Role, Session};

/// Pharmacy basket checkout: contract discount, order creation and a
/// delivery estimate based on current stock.
pub struct PharmacyCheckout {
    catalog: Arc<dyn ProductCatalog>,
    orders: Arc<dyn PharmacyOrderRepository>,
    contracts: ContractService,
    delivery: DeliveryPolicy,
}

impl PharmacyCheckout {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn PharmacyOrderRepository>,
        contracts: ContractService,
        delivery: DeliveryPolicy,
    ) -> Self {
        Self {
            catalog,
            orders,
            contracts,
            delivery,
        }
    }

    fn estimate_delivery(&self, lines: &[CartLine]) -> Result<u32, DomainError> {
        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
        let available = self.catalog.fetch_available_counts(&ids)?;
        self.delivery.estimate(lines, &available)
    }
}

impl CartStrategy for PharmacyCheckout {
    fn fetch_products(&self) -> Result<Vec<Product>, DomainError> {
        self.catalog.fetch_products()
    }

    fn stock_status(&self, product: &Product) -> StockStatus {
        if product.stock_qty > 0 {
            StockStatus {
                label: format!("Available ({})", product.stock_qty),
                in_stock: true,
                note: None,
            }
        } else {
            StockStatus {
                label: format!("Out of stock ({})", product.stock_qty.max(0)),
                in_stock: false,
                note: Some("Out of stock items extend the delivery time.".to_string()),
            }
        }
    }

    fn discount_percent(&self, session: &Session) -> Result<BigDecimal, DomainError> {
        self.contracts.active_discount(&session.user)
    }

    fn complete(
        &self,
        session: &Session,
        lines: &[CartLine],
        totals: &OrderTotals,
    ) -> Result<Completion, DomainError> {
        session.require(Role::Pharmacy)?;
        if self
            .contracts
            .active_contract(&session.user, Utc::now())?
            .is_none()
        {
            return Err(DomainError::NoActiveContract);
        }

        let order_id = self
            .orders
            .create_order(&session.user, lines, &totals.final_total)?;
        let reference = format!("#{order_id}");

        // The order already exists at this point; a failed lookup only costs the estimate.
        let delivery_days = match self.estimate_delivery(lines) {
            Ok(days) => Some(days),
            Err(e) => {
                log::warn!("Delivery estimate for order {} failed: {}", reference, e);
                None
            }
        };

        let message = match delivery_days {
            Some(days) => format!(
                "Order {reference} created. Estimated delivery in {days} {}.",
                if days == 1 { "day" } else { "days" }
            ),
            None => format!("Order {reference} created."),
        };

        Ok(Completion {
            reference,
            message,
            totals: totals.clone(),
            delivery_days,
        })
    }
}
