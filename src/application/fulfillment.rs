use std::sync::Arc;

use chrono::Utc;

use crate::domain::errors::DomainError;
use crate::domain::order::{CartLine, OrderFilter, OrderId, OrderStatus, PharmacyOrder};
use crate::domain::ports::{PharmacyOrderRepository, SupplierOrderRepository};
use crate::domain::session::{Role, Session};
use crate::domain::shortage::{detect_shortages, ShortageLine, ShortageOutcome};
use crate::domain::supplier::{
    supplier_items, supplier_ref, supplier_total, SupplierOrder, SupplierOrderId,
    SupplierOrderStatus,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ForwardOutcome {
    NoShortage,
    Forwarded {
        supplier_order_id: SupplierOrderId,
        lines: Vec<ShortageLine>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shipment {
    pub order_id: OrderId,
    pub units_shipped: i64,
}

/// Warehouse-side handling of pharmacy orders and supplier orders.
#[derive(Clone)]
pub struct FulfillmentService {
    orders: Arc<dyn PharmacyOrderRepository>,
    supplier_orders: Arc<dyn SupplierOrderRepository>,
}

impl FulfillmentService {
    pub fn new(
        orders: Arc<dyn PharmacyOrderRepository>,
        supplier_orders: Arc<dyn SupplierOrderRepository>,
    ) -> Self {
        Self {
            orders,
            supplier_orders,
        }
    }

    pub fn list_orders(
        &self,
        session: &Session,
        status: Option<OrderStatus>,
    ) -> Result<Vec<PharmacyOrder>, DomainError> {
        session.require(Role::Warehouse)?;
        self.orders.list(&OrderFilter {
            pharmacy: None,
            status,
        })
    }

    /// Moves an order to `status`. Shipping goes through [`Self::ship`] so
    /// inventory is always decremented.
    pub fn set_status(
        &self,
        session: &Session,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, DomainError> {
        if status == OrderStatus::Shipped {
            self.ship(session, id)?;
            return Ok(OrderStatus::Shipped);
        }
        session.require(Role::Warehouse)?;
        let order = self.load(id)?;
        let next = order.status.transition_to(status)?;
        self.orders.update_status(id, order.status, next)?;
        log::info!("Order #{} moved {} -> {}", id, order.status, next);
        Ok(next)
    }

    /// The status check happens in the repository, in the same write that
    /// takes stock, so an order ships at most once.
    pub fn ship(&self, session: &Session, id: OrderId) -> Result<Shipment, DomainError> {
        session.require(Role::Warehouse)?;
        let units_shipped = self.orders.ship(id, Utc::now())?;
        log::info!("Order #{} shipped, {} units", id, units_shipped);
        Ok(Shipment {
            order_id: id,
            units_shipped,
        })
    }

    /// Raises a supplier order for whatever the pharmacy order is missing and
    /// puts a pending order into processing.
    pub fn forward_shortages(
        &self,
        session: &Session,
        id: OrderId,
    ) -> Result<ForwardOutcome, DomainError> {
        session.require(Role::Warehouse)?;
        let order = self.load(id)?;
        if order.status.is_terminal() {
            return Err(DomainError::Conflict(format!(
                "order #{} is already {}",
                id, order.status
            )));
        }

        let lines = match detect_shortages(&order.items)? {
            ShortageOutcome::NoShortage => return Ok(ForwardOutcome::NoShortage),
            ShortageOutcome::Shortages(lines) => lines,
        };

        let cart_lines: Vec<CartLine> = lines.iter().cloned().map(CartLine::from).collect();
        let items = supplier_items(&cart_lines);
        if items.is_empty() {
            return Err(DomainError::EmptyOrder);
        }
        let supplier_order_id = self
            .supplier_orders
            .create(&items, &supplier_total(&items))?;
        log::info!(
            "Supplier order {} raised for shortages of order #{}",
            supplier_ref(supplier_order_id),
            id
        );

        if order.status == OrderStatus::Pending {
            let moved = self
                .orders
                .update_status(id, OrderStatus::Pending, OrderStatus::Processing);
            if let Err(e) = moved {
                log::warn!("Order #{} left {}: {}", id, order.status, e);
            }
        }

        Ok(ForwardOutcome::Forwarded {
            supplier_order_id,
            lines,
        })
    }

    pub fn list_supplier_orders(
        &self,
        session: &Session,
        status: Option<SupplierOrderStatus>,
    ) -> Result<Vec<SupplierOrder>, DomainError> {
        session.require(Role::Warehouse)?;
        self.supplier_orders.list(status)
    }

    pub fn complete_supplier_order(
        &self,
        session: &Session,
        id: SupplierOrderId,
    ) -> Result<SupplierOrder, DomainError> {
        session.require(Role::Warehouse)?;
        let previous = self
            .supplier_orders
            .update_status(id, SupplierOrderStatus::Completed)?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Supplier order {}", supplier_ref(id)))
            })?;
        if previous.status == SupplierOrderStatus::Completed {
            return Err(DomainError::Conflict(format!(
                "supplier order {} is already completed",
                supplier_ref(id)
            )));
        }
        log::info!("Supplier order {} completed", supplier_ref(id));
        Ok(SupplierOrder {
            status: SupplierOrderStatus::Completed,
            ..previous
        })
    }

    fn load(&self, id: OrderId) -> Result<PharmacyOrder, DomainError> {
        self.orders
            .find_by_id(id)?
            .ok_or_else(|| DomainError::NotFound(format!("Order #{id}")))
    }
}
