use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::dto::{
    CartRequest, CompletionResponse, OrderItemResponse, ProductQuery, ProductResponse, StatusQuery,
};
use super::{run_blocking, status_filter};
use crate::application::contracts::SignContract;
use crate::application::history::{DeliveryView, HistoryEntry};
use crate::domain::contract::{duration_label, Contract, ContractId};
use crate::domain::order::OrderStatus;
use crate::domain::pricing::{format_money, format_percent};
use crate::domain::session::{Role, Session};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeliveryResponse {
    /// One of `cancelled`, `shipped`, `expected` or `unknown`.
    pub state: String,
    pub at: Option<String>,
    pub days_remaining: Option<i64>,
}

impl From<&DeliveryView> for DeliveryResponse {
    fn from(view: &DeliveryView) -> Self {
        let (state, at, days_remaining) = match view {
            DeliveryView::Cancelled => ("cancelled", None, None),
            DeliveryView::Shipped { at } => ("shipped", Some(at.to_rfc3339()), None),
            DeliveryView::Expected { at, days_remaining } => {
                ("expected", Some(at.to_rfc3339()), Some(*days_remaining))
            }
            DeliveryView::Unknown => ("unknown", None, None),
        };
        Self {
            state: state.to_string(),
            at,
            days_remaining,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryResponse {
    pub reference: String,
    pub status: String,
    pub total_cost: String,
    pub executed_at: String,
    pub delivery: DeliveryResponse,
    pub items: Vec<OrderItemResponse>,
}

impl From<HistoryEntry> for HistoryEntryResponse {
    fn from(entry: HistoryEntry) -> Self {
        let HistoryEntry { order, delivery } = entry;
        Self {
            reference: order.display_ref(),
            status: order.status.to_string(),
            total_cost: format_money(&order.total_cost),
            executed_at: order.executed_at.to_rfc3339(),
            delivery: DeliveryResponse::from(&delivery),
            items: order.items.iter().map(OrderItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractResponse {
    pub id: ContractId,
    pub duration: String,
    pub discount: String,
    pub frequency: String,
    pub payment: String,
    pub signed_at: String,
    pub expires_at: String,
    pub is_active: bool,
}

impl From<Contract> for ContractResponse {
    fn from(c: Contract) -> Self {
        Self {
            id: c.id,
            duration: duration_label(i64::from(c.duration_months)),
            discount: format_percent(&c.discount_percent),
            frequency: c.frequency,
            payment: c.payment,
            signed_at: c.signed_at.to_rfc3339(),
            expires_at: c.expires_at.to_rfc3339(),
            is_active: c.is_active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContractsResponse {
    pub active: Option<ContractResponse>,
    pub history: Vec<ContractResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignContractRequest {
    /// "6 months", "1 year" or "2 years"
    pub duration: String,
    pub frequency: String,
    pub payment: String,
}

#[derive(Debug, Deserialize)]
pub struct DiscountQuery {
    pub duration: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscountOffer {
    pub duration: String,
    pub discount: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiscountResponse {
    pub duration: String,
    pub discount: String,
    pub offers: Vec<DiscountOffer>,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /pharmacy/products
#[utoipa::path(
    get,
    path = "/pharmacy/products",
    params(
        ("q" = Option<String>, Query, description = "Product name search"),
    ),
    responses(
        (status = 200, description = "Catalogue with stock status", body = Vec<ProductResponse>),
        (status = 401, description = "Missing session headers"),
        (status = 403, description = "Caller is not a pharmacy"),
    ),
    tag = "pharmacy"
)]
pub async fn list_products(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<ProductQuery>,
) -> Result<HttpResponse, AppError> {
    session.require(Role::Pharmacy)?;
    let state = state.get_ref().clone();
    let search = query.into_inner().q.unwrap_or_default();
    let listings = run_blocking(move || state.pharmacy_cart().search(&search)).await?;
    let body: Vec<ProductResponse> = listings.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /pharmacy/orders
///
/// Fills a pharmacy cart from the request and checks it out. The order total
/// carries the discount of the pharmacy's active contract.
#[utoipa::path(
    post,
    path = "/pharmacy/orders",
    request_body = CartRequest,
    responses(
        (status = 201, description = "Order created", body = CompletionResponse),
        (status = 400, description = "Empty cart or invalid line"),
        (status = 409, description = "No active contract"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "pharmacy"
)]
pub async fn checkout(
    state: web::Data<AppState>,
    session: Session,
    body: web::Json<CartRequest>,
) -> Result<HttpResponse, AppError> {
    session.require(Role::Pharmacy)?;
    let state = state.get_ref().clone();
    let request = body.into_inner();

    let completion = run_blocking(move || {
        let mut cart = state.pharmacy_cart();
        let catalog = cart.products()?;
        for line in &request.lines {
            cart.add_from_catalog(&catalog, line.product_id, line.quantity)?;
        }
        cart.complete(&session)
    })
    .await?;

    Ok(HttpResponse::Created().json(CompletionResponse::from(completion)))
}

/// GET /pharmacy/orders
#[utoipa::path(
    get,
    path = "/pharmacy/orders",
    params(
        ("status" = Option<String>, Query, description = "PENDING, PROCESSING, SHIPPED, CANCELLED or all"),
    ),
    responses(
        (status = 200, description = "Own orders with delivery information", body = Vec<HistoryEntryResponse>),
        (status = 400, description = "Unknown status filter"),
    ),
    tag = "pharmacy"
)]
pub async fn order_history(
    state: web::Data<AppState>,
    session: Session,
    query: web::Query<StatusQuery>,
) -> Result<HttpResponse, AppError> {
    let status = status_filter::<OrderStatus>(query.status.as_deref())?;
    let state = state.get_ref().clone();
    let entries = run_blocking(move || state.history().history(&session, status, Utc::now())).await?;
    let body: Vec<HistoryEntryResponse> =
        entries.into_iter().map(HistoryEntryResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /pharmacy/contracts
#[utoipa::path(
    get,
    path = "/pharmacy/contracts",
    responses(
        (status = 200, description = "Active contract and contract history", body = ContractsResponse),
    ),
    tag = "pharmacy"
)]
pub async fn list_contracts(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    session.require(Role::Pharmacy)?;
    let state = state.get_ref().clone();
    let (active, history) = run_blocking(move || {
        let contracts = state.contract_service();
        let active = contracts.active_contract(&session.user, Utc::now())?;
        let history = contracts.history(&session.user)?;
        Ok((active, history))
    })
    .await?;

    Ok(HttpResponse::Ok().json(ContractsResponse {
        active: active.map(ContractResponse::from),
        history: history.into_iter().map(ContractResponse::from).collect(),
    }))
}

/// POST /pharmacy/contracts
#[utoipa::path(
    post,
    path = "/pharmacy/contracts",
    request_body = SignContractRequest,
    responses(
        (status = 201, description = "Contract signed", body = ContractResponse),
        (status = 400, description = "Unknown duration or missing terms"),
        (status = 409, description = "An active contract already exists"),
    ),
    tag = "pharmacy"
)]
pub async fn sign_contract(
    state: web::Data<AppState>,
    session: Session,
    body: web::Json<SignContractRequest>,
) -> Result<HttpResponse, AppError> {
    let state = state.get_ref().clone();
    let body = body.into_inner();
    let request = SignContract {
        duration_label: body.duration,
        frequency: body.frequency,
        payment: body.payment,
    };
    let contract = run_blocking(move || state.contract_service().sign(&session, request)).await?;
    Ok(HttpResponse::Created().json(ContractResponse::from(contract)))
}

/// DELETE /pharmacy/contracts/active
#[utoipa::path(
    delete,
    path = "/pharmacy/contracts/active",
    responses(
        (status = 200, description = "Contract cancelled", body = ContractResponse),
        (status = 404, description = "No active contract"),
    ),
    tag = "pharmacy"
)]
pub async fn cancel_contract(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let state = state.get_ref().clone();
    let contract = run_blocking(move || state.contract_service().cancel(&session)).await?;
    Ok(HttpResponse::Ok().json(ContractResponse::from(contract)))
}

/// GET /contracts/discount
///
/// Discount a contract of the given duration would grant. Unknown durations
/// get 0%.
#[utoipa::path(
    get,
    path = "/contracts/discount",
    params(
        ("duration" = Option<String>, Query, description = "Duration label, e.g. \"1 year\""),
    ),
    responses(
        (status = 200, description = "Discount for the duration", body = DiscountResponse),
    ),
    tag = "contracts"
)]
pub async fn discount_hint(
    state: web::Data<AppState>,
    _session: Session,
    query: web::Query<DiscountQuery>,
) -> Result<HttpResponse, AppError> {
    let duration = query.into_inner().duration.unwrap_or_default();
    let contracts = state.contract_service();
    let discount = contracts.discount_hint(&duration);
    let offers = contracts
        .offers()
        .into_iter()
        .map(|(label, percent)| DiscountOffer {
            duration: label.to_string(),
            discount: format_percent(&percent),
        })
        .collect();
    Ok(HttpResponse::Ok().json(DiscountResponse {
        duration,
        discount: format_percent(&discount),
        offers,
    }))
}
