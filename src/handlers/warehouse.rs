use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dto::{
    CartRequest, CompletionResponse, OrderItemResponse, ProductQuery, ProductResponse, StatusQuery,
};
use super::{run_blocking, status_filter};
use crate::application::fulfillment::ForwardOutcome;
use crate::domain::order::{parse_order_ref, OrderId, OrderStatus, PharmacyOrder, ProductId};
use crate::domain::pricing::format_money;
use crate::domain::session::{Role, Session};
use crate::domain::shortage::{has_shortage, ShortageLine};
use crate::domain::supplier::{
    parse_supplier_ref, supplier_ref, SupplierOrder, SupplierOrderId, SupplierOrderItem,
    SupplierOrderStatus,
};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub reference: String,
    pub pharmacy: String,
    pub status: String,
    pub total_cost: String,
    pub executed_at: String,
    pub shipment_at: Option<String>,
    /// True when any line asks for more than the warehouse holds.
    pub has_shortage: bool,
    pub items: Vec<OrderItemResponse>,
}

impl From<PharmacyOrder> for OrderResponse {
    fn from(order: PharmacyOrder) -> Self {
        Self {
            reference: order.display_ref(),
            pharmacy: order.pharmacy,
            status: order.status.to_string(),
            total_cost: format_money(&order.total_cost),
            executed_at: order.executed_at.to_rfc3339(),
            shipment_at: order.shipment_at.map(|t| t.to_rfc3339()),
            has_shortage: has_shortage(&order.items),
            items: order.items.iter().map(OrderItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusChangeResponse {
    pub reference: String,
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShipmentResponse {
    pub reference: String,
    pub units_shipped: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShortageLineResponse {
    pub product_id: ProductId,
    pub shortage_qty: i32,
    pub unit_price: String,
}

impl From<ShortageLine> for ShortageLineResponse {
    fn from(line: ShortageLine) -> Self {
        Self {
            product_id: line.product_id,
            shortage_qty: line.shortage_qty,
            unit_price: format_money(&line.unit_price),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForwardResponse {
    pub reference: String,
    pub message: String,
    pub supplier_order: Option<String>,
    pub lines: Vec<ShortageLineResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierOrderItemResponse {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: String,
}

impl From<SupplierOrderItem> for SupplierOrderItemResponse {
    fn from(item: SupplierOrderItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: format_money(&item.unit_price),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SupplierOrderResponse {
    pub reference: String,
    pub created_at: String,
    pub status: String,
    pub total_cost: String,
    pub items: Vec<SupplierOrderItemResponse>,
}

impl From<SupplierOrder> for SupplierOrderResponse {
    fn from(order: SupplierOrder) -> Self {
        Self {
            reference: order.display_ref(),
            created_at: order.created_at.to_rfc3339(),
            status: order.status.to_string(),
            total_cost: format_money(&order.total_cost),
            items: order
                .items
                .into_iter()
                .map(SupplierOrderItemResponse::from)
                .collect(),
        }
    }
}

fn order_id(raw: &str) -> Result<OrderId, AppError> {
    parse_order_ref(raw).ok_or_else(|| AppError::BadRequest(format!("invalid order reference '{raw}'")))
}

fn supplier_order_id(raw: &str) -> Result<SupplierOrderId, AppError> {
    parse_supplier_ref(raw)
        .ok_or_else(|| AppError::BadRequest(format!("invalid supplier order reference '{raw}'")))
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /warehouse/products
#[utoipa::path(
    get,
    path = "/warehouse/products",
    params(
        ("q" = Option<String>, Query, description = "Product name search"),
    ),
    responses(
        (status = 200, description = "Catalogue with stock counts", body = Vec<ProductResponse>),
        (status = 403, description = "Caller is not the warehouse"),
    ),
    tag = "warehouse"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
    session.require(Role::Warehouse)?;
    let state = state.get_ref().clone();
    let search = query.into_inner().q.unwrap_or_default();
    let listings = run_blocking(move || state.supply_cart().search(&search)).await?;
    let body: Vec<ProductResponse> = listings.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /warehouse/orders
#[utoipa::path(
    get,
    path = "/warehouse/orders",
    params(
        ("status" = Option<String>, Query, description = "PENDING, PROCESSING, SHIPPED, CANCELLED or all"),
    ),
    responses(
        (status = 200, description = "Pharmacy orders, newest first", body = Vec<OrderResponse>),
        (status = 400, description = "Unknown status filter"),
    ),
    tag = "warehouse"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, AppError> {
    let status = status_filter::<OrderStatus>(query.status.as_deref())?;
    let state = state.get_ref().clone();
    let orders = run_blocking(move || state.fulfillment().list_orders(&session, status)).await?;
    let body: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /warehouse/orders/{reference}/status
///
/// Moving an order to SHIPPED goes through the same path as the ship
/// endpoint, so inventory is always decremented.
#[utoipa::path(
    post,
    path = "/warehouse/orders/{reference}/status",
    params(
        ("reference" = String, Path, description = "Order reference, e.g. 12"),
    ),
    request_body = StatusChangeRequest,
    responses(
        (status = 200, description = "Status changed", body = StatusChangeResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Transition not allowed"),
    ),
    tag = "warehouse"
)]
pub async fn set_status(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
    body: web::Json<StatusChangeRequest>,
) -> Result<HttpResponse, AppError> {
    let id = order_id(&path)?;
    let status: OrderStatus = body.status.parse()?;
    let state = state.get_ref().clone();
    let next = run_blocking(move || state.fulfillment().set_status(&session, id, status)).await?;
    Ok(HttpResponse::Ok().json(StatusChangeResponse {
        reference: format!("#{id}"),
        status: next.to_string(),
    }))
}

/// POST /warehouse/orders/{reference}/ship
#[utoipa::path(
    post,
    path = "/warehouse/orders/{reference}/ship",
    params(
        ("reference" = String, Path, description = "Order reference, e.g. 12"),
    ),
    responses(
        (status = 200, description = "Order shipped", body = ShipmentResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already shipped or cancelled"),
    ),
    tag = "warehouse"
)]
pub async fn ship_order(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = order_id(&path)?;
    let state = state.get_ref().clone();
    let shipment = run_blocking(move || state.fulfillment().ship(&session, id)).await?;
    Ok(HttpResponse::Ok().json(ShipmentResponse {
        reference: format!("#{}", shipment.order_id),
        units_shipped: shipment.units_shipped,
    }))
}

/// POST /warehouse/orders/{reference}/shortages
///
/// Raises a supplier order for whatever the pharmacy order is missing.
#[utoipa::path(
    post,
    path = "/warehouse/orders/{reference}/shortages",
    params(
        ("reference" = String, Path, description = "Order reference, e.g. 12"),
    ),
    responses(
        (status = 200, description = "Shortages forwarded, or nothing to forward", body = ForwardResponse),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order already shipped or cancelled"),
    ),
    tag = "warehouse"
)]
pub async fn forward_shortages(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = order_id(&path)?;
    let state = state.get_ref().clone();
    let outcome = run_blocking(move || state.fulfillment().forward_shortages(&session, id)).await?;

    let reference = format!("#{id}");
    let body = match outcome {
        ForwardOutcome::NoShortage => ForwardResponse {
            message: format!("Order {reference} has no shortages."),
            reference,
            supplier_order: None,
            lines: Vec::new(),
        },
        ForwardOutcome::Forwarded {
            supplier_order_id,
            lines,
        } => {
            let supplier = supplier_ref(supplier_order_id);
            ForwardResponse {
                message: format!("Shortages of order {reference} forwarded as {supplier}."),
                reference,
                supplier_order: Some(supplier),
                lines: lines.into_iter().map(ShortageLineResponse::from).collect(),
            }
        }
    };
    Ok(HttpResponse::Ok().json(body))
}

/// GET /warehouse/supplier-orders
#[utoipa::path(
    get,
    path = "/warehouse/supplier-orders",
    params(
        ("status" = Option<String>, Query, description = "in-progress, completed or all"),
    ),
    responses(
        (status = 200, description = "Supplier orders, newest first", body = Vec<SupplierOrderResponse>),
    ),
    tag = "warehouse"
)]
pub async fn list_supplier_orders(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, AppError> {
    let status = status_filter::<SupplierOrderStatus>(query.status.as_deref())?;
    let state = state.get_ref().clone();
    let orders =
        run_blocking(move || state.fulfillment().list_supplier_orders(&session, status)).await?;
    let body: Vec<SupplierOrderResponse> =
        orders.into_iter().map(SupplierOrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /warehouse/supplier-orders
///
/// Checks out a supply list. Lines with a bad quantity or price are dropped.
#[utoipa::path(
    post,
    path = "/warehouse/supplier-orders",
    request_body = CartRequest,
    responses(
        (status = 201, description = "Supplier order created", body = CompletionResponse),
        (status = 400, description = "Nothing orderable in the list"),
    ),
    tag = "warehouse"
)]
pub async fn create_supplier_order(
    state: web::Data<AppState>,
    session: Session,
    body: web::Json<CartRequest>,
) -> Result<HttpResponse, AppError> {
    session.require(Role::Warehouse)?;
    let state = state.get_ref().clone();
    let request = body.into_inner();

    let completion = run_blocking(move || {
        let mut cart = state.supply_cart();
        let catalog = cart.products()?;
        for line in &request.lines {
            cart.add_from_catalog(&catalog, line.product_id, line.quantity)?;
        }
        cart.complete(&session)
    })
    .await?;

    Ok(HttpResponse::Created().json(CompletionResponse::from(completion)))
}

/// POST /warehouse/supplier-orders/{reference}/complete
#[utoipa::path(
    post,
    path = "/warehouse/supplier-orders/{reference}/complete",
    params(
        ("reference" = String, Path, description = "Supplier order reference, e.g. SUP-4"),
    ),
    responses(
        (status = 200, description = "Supplier order completed", body = SupplierOrderResponse),
        (status = 404, description = "Supplier order not found"),
        (status = 409, description = "Already completed"),
    ),
    tag = "warehouse"
)]
pub async fn complete_supplier_order(
    state: web::Data<AppState>,
    session: Session,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = supplier_order_id(&path)?;
    let state = state.get_ref().clone();
    let order =
        run_blocking(move || state.fulfillment().complete_supplier_order(&session, id)).await?;
    Ok(HttpResponse::Ok().json(SupplierOrderResponse::from(order)))
}
