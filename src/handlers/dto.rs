//! Request and response bodies shared by the pharmacy and warehouse handlers.
//! Money is always rendered as a two-decimal string.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::cart::{Completion, ProductListing};
use crate::domain::order::{OrderItem, ProductId};
use crate::domain::pricing::{format_money, format_percent};

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Name search; matches substrings and close misspellings.
    pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub company: String,
    /// Decimal price as a string, e.g. "9.99"
    pub unit_price: String,
    pub stock_qty: i32,
    pub stock_status: String,
    pub in_stock: bool,
    pub note: Option<String>,
}

impl From<ProductListing> for ProductResponse {
    fn from(listing: ProductListing) -> Self {
        let ProductListing { product, status } = listing;
        Self {
            id: product.id,
            name: product.name,
            category: product.category,
            company: product.company,
            unit_price: format_money(&product.unit_price),
            stock_qty: product.stock_qty,
            stock_status: status.label,
            in_stock: status.in_stock,
            note: status.note,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartRequest {
    pub lines: Vec<CartLineRequest>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CompletionResponse {
    pub reference: String,
    pub message: String,
    pub base_total: String,
    pub discount_percent: String,
    pub discount_amount: String,
    pub final_total: String,
    pub delivery_days: Option<u32>,
}

impl From<Completion> for CompletionResponse {
    fn from(c: Completion) -> Self {
        Self {
            reference: c.reference,
            message: c.message,
            base_total: format_money(&c.totals.base_total),
            discount_percent: format_percent(&c.totals.discount_percent),
            discount_amount: format_money(&c.totals.discount_amount),
            final_total: format_money(&c.totals.final_total),
            delivery_days: c.delivery_days,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub name: String,
    pub requested_qty: i32,
    pub available_qty: i32,
    pub shipped_qty: i32,
    pub shortage: i32,
    pub unit_price: String,
}

impl From<&OrderItem> for OrderItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            requested_qty: item.requested_qty,
            available_qty: item.available_qty,
            shipped_qty: item.shipped_qty,
            shortage: item.shortage(),
            unit_price: format_money(&item.unit_price),
        }
    }
}
