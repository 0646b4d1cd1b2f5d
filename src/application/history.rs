use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::delivery::{days_remaining, expected_delivery, DeliveryPolicy};
use crate::domain::errors::DomainError;
use crate::domain::order::{OrderFilter, OrderStatus, PharmacyOrder};
use crate::domain::ports::PharmacyOrderRepository;
use crate::domain::session::{Role, Session};

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryView {
    Cancelled,
    Shipped {
        at: DateTime<Utc>,
    },
    Expected {
        at: DateTime<Utc>,
        days_remaining: i64,
    },
    Unknown,
}

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub order: PharmacyOrder,
    pub delivery: DeliveryView,
}

pub struct HistoryService {
    orders: Arc<dyn PharmacyOrderRepository>,
    delivery: DeliveryPolicy,
}

impl HistoryService {
    pub fn new(orders: Arc<dyn PharmacyOrderRepository>, delivery: DeliveryPolicy) -> Self {
        Self { orders, delivery }
    }

    pub fn history(
        &self,
        session: &Session,
        status: Option<OrderStatus>,
        now: DateTime<Utc>,
    ) -> Result<Vec<HistoryEntry>, DomainError> {
        session.require(Role::Pharmacy)?;
        let orders = self.orders.list(&OrderFilter {
            pharmacy: Some(session.user.clone()),
            status,
        })?;
        Ok(orders
            .into_iter()
            .map(|order| {
                let delivery = self.delivery_view(&order, now);
                HistoryEntry { order, delivery }
            })
            .collect())
    }

    pub fn delivery_view(&self, order: &PharmacyOrder, now: DateTime<Utc>) -> DeliveryView {
        if order.status == OrderStatus::Cancelled {
            return DeliveryView::Cancelled;
        }
        if let Some(at) = order.shipment_at {
            return DeliveryView::Shipped { at };
        }
        match self.delivery.estimate_items(&order.items) {
            Ok(days) => DeliveryView::Expected {
                at: expected_delivery(order.executed_at, days),
                days_remaining: days_remaining(order.executed_at, days, now),
            },
            Err(_) => DeliveryView::Unknown,
        }
    }
}
