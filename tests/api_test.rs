mod common;

use std::sync::atomic::Ordering;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use common::TestWorld;
use pharmacy_supply::handlers::routes;

macro_rules! app {
    ($world:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($world.state()))
                .configure(routes),
        )
        .await
    };
}

fn as_pharmacy(req: test::TestRequest, user: &str) -> test::TestRequest {
    req.insert_header(("X-User", user))
        .insert_header(("X-Role", "pharmacy"))
}

fn as_warehouse(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("X-User", "central"))
        .insert_header(("X-Role", "warehouse"))
}

#[actix_web::test]
async fn requests_without_session_headers_are_unauthorized() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = test::TestRequest::get().uri("/pharmacy/products").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn pharmacy_catalogue_lists_stock_status() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_pharmacy(test::TestRequest::get().uri("/pharmacy/products"), "alpha").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let products = body.as_array().expect("array");
    assert_eq!(products.len(), 3);
    let zirtek = products.iter().find(|p| p["id"] == 3).unwrap();
    assert_eq!(zirtek["stock_status"], "Out of stock (0)");
    assert_eq!(zirtek["unit_price"], "5.00");
}

#[actix_web::test]
async fn catalogue_search_tolerates_misspellings() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_pharmacy(
        test::TestRequest::get().uri("/pharmacy/products?q=augmentn"),
        "alpha",
    )
    .to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    let names: Vec<&str> = found
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Augmentin 1g"]);

    let req = as_warehouse(test::TestRequest::get().uri("/warehouse/products?q=ZIRTEK")).to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["id"], 3);

    let req = as_warehouse(test::TestRequest::get().uri("/warehouse/products?q=")).to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn warehouse_cannot_browse_the_pharmacy_catalogue() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_warehouse(test::TestRequest::get().uri("/pharmacy/products")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn sign_contract_then_check_out() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_pharmacy(test::TestRequest::post().uri("/pharmacy/contracts"), "alpha")
        .set_json(json!({ "duration": "1 year", "frequency": "weekly", "payment": "invoice" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let contract: Value = test::read_body_json(resp).await;
    assert_eq!(contract["discount"], "10%");
    assert_eq!(contract["duration"], "1 year");

    let req = as_pharmacy(test::TestRequest::post().uri("/pharmacy/orders"), "alpha")
        .set_json(json!({ "lines": [
            { "product_id": 2, "quantity": 2 },
            { "product_id": 3, "quantity": 1 }
        ] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = test::read_body_json(resp).await;
    assert_eq!(order["reference"], "#1");
    assert_eq!(order["base_total"], "25.00");
    assert_eq!(order["final_total"], "22.50");
    assert_eq!(order["delivery_days"], 2);

    let req = as_pharmacy(
        test::TestRequest::get().uri("/pharmacy/orders?status=all"),
        "alpha",
    )
    .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["status"], "PENDING");
    assert_eq!(history[0]["delivery"]["state"], "expected");

    let req = as_pharmacy(test::TestRequest::get().uri("/pharmacy/contracts"), "alpha").to_request();
    let contracts: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(contracts["active"]["discount"], "10%");
    assert_eq!(contracts["history"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn checkout_errors_map_to_statuses() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_pharmacy(test::TestRequest::post().uri("/pharmacy/orders"), "alpha")
        .set_json(json!({ "lines": [] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = as_pharmacy(test::TestRequest::post().uri("/pharmacy/orders"), "alpha")
        .set_json(json!({ "lines": [{ "product_id": 1, "quantity": 1 }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "No active contract");
}

#[actix_web::test]
async fn persistence_failures_hide_their_detail() {
    let world = TestWorld::new().with_contract("alpha", "5");
    world.orders.fail_writes.store(true, Ordering::SeqCst);
    let app = app!(world);

    let req = as_pharmacy(test::TestRequest::post().uri("/pharmacy/orders"), "alpha")
        .set_json(json!({ "lines": [{ "product_id": 2, "quantity": 1 }] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Internal server error");
}

#[actix_web::test]
async fn cancelling_without_an_active_contract_is_not_found() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_pharmacy(
        test::TestRequest::delete().uri("/pharmacy/contracts/active"),
        "alpha",
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn discount_hint_for_duration_labels() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_warehouse(test::TestRequest::get().uri("/contracts/discount?duration=2%20years"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["discount"], "15%");
    assert_eq!(body["offers"].as_array().unwrap().len(), 3);
    assert_eq!(body["offers"][0]["duration"], "6 months");
    assert_eq!(body["offers"][0]["discount"], "5%");

    let req = as_warehouse(test::TestRequest::get().uri("/contracts/discount?duration=decade"))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["discount"], "0%");
}

#[actix_web::test]
async fn warehouse_forwards_shortages_and_ships() {
    let world = TestWorld::new().with_contract("alpha", "0");
    let app = app!(world);

    let req = as_pharmacy(test::TestRequest::post().uri("/pharmacy/orders"), "alpha")
        .set_json(json!({ "lines": [
            { "product_id": 1, "quantity": 10 },
            { "product_id": 2, "quantity": 3 }
        ] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = as_warehouse(test::TestRequest::post().uri("/warehouse/orders/1/shortages"))
        .to_request();
    let forwarded: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(forwarded["supplier_order"], "SUP-1");
    assert_eq!(forwarded["lines"][0]["product_id"], 1);
    assert_eq!(forwarded["lines"][0]["shortage_qty"], 6);

    let req = as_warehouse(test::TestRequest::get().uri("/warehouse/orders?status=processing"))
        .to_request();
    let orders: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["has_shortage"], true);

    let req = as_warehouse(test::TestRequest::post().uri("/warehouse/orders/1/ship")).to_request();
    let shipment: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(shipment["units_shipped"], 7);

    let req = as_warehouse(test::TestRequest::post().uri("/warehouse/orders/1/status"))
        .set_json(json!({ "status": "PENDING" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let req = as_warehouse(test::TestRequest::post().uri("/warehouse/supplier-orders/SUP-1/complete"))
        .to_request();
    let completed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(completed["status"], "completed");
    assert_eq!(completed["total_cost"], "15.00");
}

#[actix_web::test]
async fn warehouse_supply_list_checkout() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_warehouse(test::TestRequest::post().uri("/warehouse/supplier-orders"))
        .set_json(json!({ "lines": [
            { "product_id": 3, "quantity": 40 },
            { "product_id": 1, "quantity": 0 }
        ] }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["reference"], "SUP-1");
    assert_eq!(body["final_total"], "200.00");

    let req = as_warehouse(test::TestRequest::get().uri("/warehouse/supplier-orders?status=in-progress"))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["items"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn bad_references_and_filters_are_rejected() {
    let world = TestWorld::new();
    let app = app!(world);

    let req = as_warehouse(test::TestRequest::post().uri("/warehouse/orders/abc/ship")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = as_warehouse(test::TestRequest::post().uri("/warehouse/orders/42/ship")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = as_warehouse(test::TestRequest::get().uri("/warehouse/orders?status=lost")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = as_pharmacy(test::TestRequest::get().uri("/warehouse/orders"), "alpha").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}
