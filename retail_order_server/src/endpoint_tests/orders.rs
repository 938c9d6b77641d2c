use actix_web::{http::StatusCode, web, web::ServiceConfig};
use retail_order_engine::{db_types::OrderStatusType, OrderFlowApi, StockDecrement};
use serde_json::json;

use super::{
    helpers::{as_admin, as_user, get, post_json, put_json, send_request},
    mocks::{order_fixture, product_fixture, stored_order, MockStore},
};
use crate::routes::{AllOrdersRoute, CreateOrderRoute, MyOrdersRoute, UpdateOrderRoute};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = OrderFlowApi::new(store);
        cfg.app_data(web::Data::new(api))
            .service(AllOrdersRoute::<MockStore>::new())
            .service(CreateOrderRoute::<MockStore>::new())
            .service(MyOrdersRoute::<MockStore>::new())
            .service(UpdateOrderRoute::<MockStore>::new());
    }
}

fn order_body() -> serde_json::Value {
    json!({
        "orderItems": [{"product": "widget", "quantity": 2}],
        "shippingAddress": {
            "address": "1 Main Road",
            "city": "Cape Town",
            "postalCode": "8001",
            "country": "ZA"
        },
        "totalPrice": 398
    })
}

#[actix_web::test]
async fn create_order_places_and_returns_the_order() {
    let mut store = MockStore::new();
    store.expect_fetch_product().returning(|id| Ok(Some(product_fixture(id, 10))));
    store.expect_decrement_stock().returning(|_, _| Ok(StockDecrement::Applied));
    store.expect_insert_order().returning(|order, items| Ok(stored_order(order, items)));
    let req = as_user(post_json("/orders", &order_body()), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains("\"orderId\""), "body: {body}");
    assert!(body.contains("\"isPaid\":false"), "body: {body}");
    assert!(body.contains("\"status\":\"Pending\""), "body: {body}");
}

#[actix_web::test]
async fn create_order_requires_authentication() {
    let store = MockStore::new();
    let (status, _) = send_request(post_json("/orders", &order_body()), configure(store)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn create_order_with_no_items_is_rejected() {
    let store = MockStore::new();
    let body = json!({
        "orderItems": [],
        "shippingAddress": {"address": "1 Main Road", "city": "Cape Town", "postalCode": "8001", "country": "ZA"},
        "totalPrice": 0
    });
    let req = as_user(post_json("/orders", &body), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("at least one line item"), "body: {body}");
}

#[actix_web::test]
async fn insufficient_stock_compensates_earlier_reservations() {
    let mut store = MockStore::new();
    store.expect_fetch_product().returning(|id| Ok(Some(product_fixture(id, 10))));
    store.expect_decrement_stock().returning(|id, _| {
        if id.as_str() == "widget" {
            Ok(StockDecrement::Applied)
        } else {
            Ok(StockDecrement::Insufficient { available: 0 })
        }
    });
    // The widget reservation must be rolled back exactly once.
    store.expect_restore_stock().times(1).withf(|id, qty| id.as_str() == "widget" && *qty == 2).returning(|_, _| Ok(()));
    let body = json!({
        "orderItems": [
            {"product": "widget", "quantity": 2},
            {"product": "gadget", "quantity": 1}
        ],
        "shippingAddress": {"address": "1 Main Road", "city": "Cape Town", "postalCode": "8001", "country": "ZA"},
        "totalPrice": 1398
    });
    let req = as_user(post_json("/orders", &body), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Insufficient stock"), "body: {body}");
}

#[actix_web::test]
async fn my_orders_returns_own_orders() {
    let mut store = MockStore::new();
    store
        .expect_fetch_orders_for_user()
        .withf(|user_id| user_id == "alice")
        .returning(|_| Ok(vec![order_fixture("o-2", "alice", true), order_fixture("o-1", "alice", false)]));
    let req = as_user(get("/orders"), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("o-2") && body.contains("o-1"), "body: {body}");
}

#[actix_web::test]
async fn all_orders_is_admin_only() {
    let store = MockStore::new();
    let req = as_user(get("/orders/all"), "alice");
    let (status, _) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn all_orders_returns_everything_for_admins() {
    let mut store = MockStore::new();
    store
        .expect_fetch_all_orders()
        .returning(|| Ok(vec![order_fixture("o-9", "bob", false), order_fixture("o-3", "alice", true)]));
    let req = as_admin(get("/orders/all"), "root");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("o-9") && body.contains("o-3"), "body: {body}");
}

#[actix_web::test]
async fn admin_update_sets_payment_and_status() {
    let mut store = MockStore::new();
    store.expect_fetch_order().returning(|oid| Ok(Some(order_fixture(oid.as_str(), "alice", false))));
    store.expect_update_order().returning(|oid, update| {
        let mut order = order_fixture(oid.as_str(), "alice", true);
        if let Some(status) = update.status {
            order.status = status;
        }
        Ok(Some(order))
    });
    let req = as_admin(put_json("/orders/o-1", &json!({"isPaid": true, "status": "Shipped"})), "root");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"isPaid\":true"), "body: {body}");
    assert!(body.contains("\"status\":\"Shipped\""), "body: {body}");
}

#[actix_web::test]
async fn admin_update_refuses_status_regression() {
    let mut store = MockStore::new();
    store.expect_fetch_order().returning(|oid| {
        let mut order = order_fixture(oid.as_str(), "alice", true);
        order.status = OrderStatusType::Delivered;
        Ok(Some(order))
    });
    let req = as_admin(put_json("/orders/o-1", &json!({"status": "Pending"})), "root");
    let (status, _) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn admin_update_of_unknown_order_is_404() {
    let mut store = MockStore::new();
    store.expect_fetch_order().returning(|_| Ok(None));
    let req = as_admin(put_json("/orders/ghost", &json!({"isPaid": true})), "root");
    let (status, _) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
