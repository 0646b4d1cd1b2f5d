use utoipa::OpenApi;

use super::{pharmacy, warehouse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pharmacy supply service",
        description = "Ordering, contracts and fulfilment between pharmacies and the central warehouse. \
                       Every call carries the X-User and X-Role headers set by the authenticator."
    ),
    paths(
        pharmacy::list_products,
        pharmacy::checkout,
        pharmacy::order_history,
        pharmacy::list_contracts,
        pharmacy::sign_contract,
        pharmacy::cancel_contract,
        pharmacy::discount_hint,
        warehouse::list_products,
        warehouse::list_orders,
        warehouse::set_status,
        warehouse::ship_order,
        warehouse::forward_shortages,
        warehouse::list_supplier_orders,
        warehouse::create_supplier_order,
        warehouse::complete_supplier_order,
    ),
    tags(
        (name = "pharmacy", description = "Pharmacy catalogue, checkout, history and contracts"),
        (name = "contracts", description = "Contract discount lookup"),
        (name = "warehouse", description = "Order fulfilment and supplier orders"),
    )
)]
pub struct ApiDoc;
