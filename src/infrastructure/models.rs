use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::schema::{contracts, pharmacy_order_items, pharmacy_orders, products};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub company: String,
    pub unit_price: BigDecimal,
    pub stock_qty: i32,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = pharmacy_orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PharmacyOrderRow {
    pub id: i32,
    pub pharmacy: String,
    pub status: String,
    pub total_cost: BigDecimal,
    pub executed_at: DateTime<Utc>,
    pub shipment_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pharmacy_orders)]
pub struct NewPharmacyOrderRow<'a> {
    pub pharmacy: &'a str,
    pub status: &'a str,
    pub total_cost: BigDecimal,
    pub executed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = pharmacy_order_items)]
#[diesel(belongs_to(PharmacyOrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PharmacyOrderItemRow {
    pub id: i32,
    pub order_id: i32,
    pub product_id: i32,
    pub requested_qty: i32,
    pub unit_price: BigDecimal,
    pub shipped_qty: i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = pharmacy_order_items)]
pub struct NewPharmacyOrderItemRow {
    pub order_id: i32,
    pub product_id: i32,
    pub requested_qty: i32,
    pub unit_price: BigDecimal,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = contracts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ContractRow {
    pub id: i32,
    pub pharmacy: String,
    pub duration_months: i32,
    pub discount_percent: BigDecimal,
    pub frequency: String,
    pub payment: String,
    pub signed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = contracts)]
pub struct NewContractRow {
    pub pharmacy: String,
    pub duration_months: i32,
    pub discount_percent: BigDecimal,
    pub frequency: String,
    pub payment: String,
    pub signed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_active: bool,
}
