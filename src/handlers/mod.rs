pub mod docs;
pub mod dto;
pub mod pharmacy;
pub mod session;
pub mod warehouse;

use std::str::FromStr;

use actix_web::web;

use crate::domain::errors::DomainError;
use crate::errors::AppError;

/// Runs repository-bound work on the blocking thread pool.
pub(crate) async fn run_blocking<F, T>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    web::block(work)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

/// `status=all`, an empty value or no parameter at all means "no filter".
pub(crate) fn status_filter<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = DomainError>,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(AppError::from),
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pharmacy")
            .route("/products", web::get().to(pharmacy::list_products))
            .route("/orders", web::post().to(pharmacy::checkout))
            .route("/orders", web::get().to(pharmacy::order_history))
            .route("/contracts", web::get().to(pharmacy::list_contracts))
            .route("/contracts", web::post().to(pharmacy::sign_contract))
            .route("/contracts/active", web::delete().to(pharmacy::cancel_contract)),
    )
    .route("/contracts/discount", web::get().to(pharmacy::discount_hint))
    .service(
        web::scope("/warehouse")
            .route("/products", web::get().to(warehouse::list_products))
            .route("/orders", web::get().to(warehouse::list_orders))
            .route("/orders/{reference}/status", web::post().to(warehouse::set_status))
            .route("/orders/{reference}/ship", web::post().to(warehouse::ship_order))
            .route(
                "/orders/{reference}/shortages",
                web::post().to(warehouse::forward_shortages),
            )
            .route("/supplier-orders", web::get().to(warehouse::list_supplier_orders))
            .route("/supplier-orders", web::post().to(warehouse::create_supplier_order))
            .route(
                "/supplier-orders/{reference}/complete",
                web::post().to(warehouse::complete_supplier_order),
            ),
    );
}
