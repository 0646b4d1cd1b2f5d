use std::collections::HashMap;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CartLine, OrderFilter, OrderId, OrderItem, OrderStatus, PharmacyOrder,
};
use crate::domain::ports::PharmacyOrderRepository;
use crate::schema::{pharmacy_order_items, pharmacy_orders, products};

use super::models::{
    NewPharmacyOrderItemRow, NewPharmacyOrderRow, PharmacyOrderItemRow, PharmacyOrderRow,
};

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Items of the given orders, with product names and current stock, keyed by order id.
fn load_items(
    conn: &mut PgConnection,
    order_ids: &[i32],
) -> QueryResult<HashMap<i32, Vec<OrderItem>>> {
    let rows: Vec<(PharmacyOrderItemRow, String, i32)> = pharmacy_order_items::table
        .inner_join(products::table)
        .filter(pharmacy_order_items::order_id.eq_any(order_ids.to_vec()))
        .order(pharmacy_order_items::id.asc())
        .select((
            PharmacyOrderItemRow::as_select(),
            products::name,
            products::stock_qty,
        ))
        .load(conn)?;

    let mut by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
    for (item, name, stock_qty) in rows {
        by_order.entry(item.order_id).or_default().push(OrderItem {
            product_id: item.product_id,
            name,
            requested_qty: item.requested_qty,
            available_qty: stock_qty,
            shipped_qty: item.shipped_qty,
            unit_price: item.unit_price,
        });
    }
    Ok(by_order)
}

fn to_order(row: PharmacyOrderRow, items: Vec<OrderItem>) -> Result<PharmacyOrder, DomainError> {
    let status = parse_status(row.id, &row.status)?;
    Ok(PharmacyOrder {
        id: row.id,
        pharmacy: row.pharmacy,
        status,
        total_cost: row.total_cost,
        executed_at: row.executed_at,
        shipment_at: row.shipment_at,
        items,
    })
}

impl PharmacyOrderRepository for DieselOrderRepository {
    fn create_order(
        &self,
        pharmacy: &str,
        lines: &[CartLine],
        total: &BigDecimal,
    ) -> Result<OrderId, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order header
            let order_id: i32 = diesel::insert_into(pharmacy_orders::table)
                .values(&NewPharmacyOrderRow {
                    pharmacy,
                    status: OrderStatus::Pending.as_str(),
                    total_cost: total.clone(),
                    executed_at: Utc::now(),
                })
                .returning(pharmacy_orders::id)
                .get_result(conn)?;

            // 2. Insert the requested lines
            let new_items: Vec<NewPharmacyOrderItemRow> = lines
                .iter()
                .map(|l| NewPharmacyOrderItemRow {
                    order_id,
                    product_id: l.product_id,
                    requested_qty: l.quantity,
                    unit_price: l.unit_price.clone(),
                })
                .collect();
            diesel::insert_into(pharmacy_order_items::table)
                .values(&new_items)
                .execute(conn)?;

            Ok(order_id)
        })
    }

    fn find_by_id(&self, id: OrderId) -> Result<Option<PharmacyOrder>, DomainError> {
        let mut conn = self.pool.get()?;

        let order = pharmacy_orders::table
            .filter(pharmacy_orders::id.eq(id))
            .select(PharmacyOrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        let Some(order) = order else {
            return Ok(None);
        };

        let mut items = load_items(&mut conn, &[order.id])?;
        let items = items.remove(&order.id).unwrap_or_default();
        to_order(order, items).map(Some)
    }

    fn list(&self, filter: &OrderFilter) -> Result<Vec<PharmacyOrder>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = pharmacy_orders::table
            .select(PharmacyOrderRow::as_select())
            .order(pharmacy_orders::executed_at.desc())
            .into_boxed();
        if let Some(pharmacy) = &filter.pharmacy {
            query = query.filter(pharmacy_orders::pharmacy.eq(pharmacy));
        }
        if let Some(status) = filter.status {
            query = query.filter(pharmacy_orders::status.eq(status.as_str()));
        }
        let rows: Vec<PharmacyOrderRow> = query.load(&mut conn)?;

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let mut items = load_items(&mut conn, &ids)?;
        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                to_order(row, order_items)
            })
            .collect()
    }

    fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), DomainError> {
        from.transition_to(to)?;
        let mut conn = self.pool.get()?;

        let updated = diesel::update(
            pharmacy_orders::table
                .filter(pharmacy_orders::id.eq(id))
                .filter(pharmacy_orders::status.eq(from.as_str())),
        )
        .set(pharmacy_orders::status.eq(to.as_str()))
        .execute(&mut conn)?;
        if updated == 1 {
            return Ok(());
        }

        // Nothing matched: either the order is gone or someone moved it first.
        match current_status(&mut conn, id)? {
            None => Err(DomainError::NotFound(format!("Order #{id}"))),
            Some(current) => Err(DomainError::InvalidTransition { from: current, to }),
        }
    }

    fn ship(&self, id: OrderId, shipped_at: DateTime<Utc>) -> Result<i64, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Lock the order row so concurrent ships and cancels queue behind us.
            let status: Option<String> = pharmacy_orders::table
                .find(id)
                .select(pharmacy_orders::status)
                .for_update()
                .get_result(conn)
                .optional()?;
            let status = status.ok_or_else(|| DomainError::NotFound(format!("Order #{id}")))?;
            parse_status(id, &status)?.transition_to(OrderStatus::Shipped)?;

            let items: Vec<(PharmacyOrderItemRow, i32)> = pharmacy_order_items::table
                .inner_join(products::table)
                .filter(pharmacy_order_items::order_id.eq(id))
                .select((PharmacyOrderItemRow::as_select(), products::stock_qty))
                .for_update()
                .load(conn)?;

            // Ship what is on hand; the rest stays outstanding.
            let mut units: i64 = 0;
            for (item, stock_qty) in items {
                let shipped = item.requested_qty.min(stock_qty.max(0));
                if shipped > 0 {
                    diesel::update(products::table.find(item.product_id))
                        .set(products::stock_qty.eq(products::stock_qty - shipped))
                        .execute(conn)?;
                }
                diesel::update(pharmacy_order_items::table.find(item.id))
                    .set(pharmacy_order_items::shipped_qty.eq(shipped))
                    .execute(conn)?;
                units += i64::from(shipped);
            }

            diesel::update(pharmacy_orders::table.find(id))
                .set((
                    pharmacy_orders::status.eq(OrderStatus::Shipped.as_str()),
                    pharmacy_orders::shipment_at.eq(Some(shipped_at)),
                ))
                .execute(conn)?;
            Ok(units)
        })
    }
}

fn parse_status(id: OrderId, raw: &str) -> Result<OrderStatus, DomainError> {
    raw.parse::<OrderStatus>()
        .map_err(|e| DomainError::Internal(format!("order #{id}: {e}")))
}

fn current_status(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<OrderStatus>, DomainError> {
    let status: Option<String> = pharmacy_orders::table
        .find(id)
        .select(pharmacy_orders::status)
        .get_result(conn)
        .optional()?;
    status.map(|s| parse_status(id, &s)).transpose()
}
