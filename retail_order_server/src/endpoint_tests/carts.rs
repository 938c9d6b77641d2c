use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use retail_order_engine::{db_types::Cart, CartApi};
use serde_json::json;

use super::{
    helpers::{as_user, get, post_json, send_request},
    mocks::{product_fixture, MockStore},
};
use crate::cart_routes::{AddCartItemRoute, MergeCartRoute, MyCartRoute, SaveCartRoute};

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = CartApi::new(store);
        cfg.app_data(web::Data::new(api))
            .service(MyCartRoute::<MockStore>::new())
            .service(SaveCartRoute::<MockStore>::new())
            .service(AddCartItemRoute::<MockStore>::new())
            .service(MergeCartRoute::<MockStore>::new());
    }
}

/// The upsert mock echoes whatever item set the api decided on, which is exactly what
/// the clamping assertions need to observe.
fn echoing_store() -> MockStore {
    let mut store = MockStore::new();
    store.expect_upsert_cart().returning(|user_id, items| {
        Ok(Cart { user_id: user_id.to_string(), items: items.to_vec(), updated_at: Utc::now() })
    });
    store
}

#[actix_web::test]
async fn carts_are_created_lazily_on_first_fetch() {
    let mut store = echoing_store();
    store.expect_fetch_cart().returning(|_| Ok(None));
    let req = as_user(get("/cart"), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"items\":[]"), "body: {body}");
}

#[actix_web::test]
async fn adding_more_than_stock_clamps_the_quantity() {
    let mut store = echoing_store();
    store.expect_fetch_cart().returning(|_| Ok(None));
    store.expect_fetch_product().returning(|id| Ok(Some(product_fixture(id, 3))));
    // Stock is 3; asking for 5 must succeed with quantity 3, not error.
    let req = as_user(post_json("/cart/items", &json!({"product": "widget", "quantity": 5})), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"quantity\":3"), "body: {body}");
}

#[actix_web::test]
async fn adding_an_unknown_product_is_404() {
    let mut store = MockStore::new();
    store.expect_fetch_product().returning(|_| Ok(None));
    let req = as_user(post_json("/cart/items", &json!({"product": "ghost", "quantity": 1})), "alice");
    let (status, _) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn saving_a_cart_drops_unknown_products() {
    let mut store = echoing_store();
    store.expect_fetch_product().returning(|id| {
        if id.as_str() == "widget" {
            Ok(Some(product_fixture(id, 10)))
        } else {
            Ok(None)
        }
    });
    let body = json!({"items": [{"product": "widget", "quantity": 2}, {"product": "ghost", "quantity": 1}]});
    let req = as_user(post_json("/cart", &body), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("widget"), "body: {body}");
    assert!(!body.contains("ghost"), "body: {body}");
}

#[actix_web::test]
async fn merging_sums_quantities_before_clamping() {
    let mut store = echoing_store();
    store.expect_fetch_cart().returning(|user_id| {
        Ok(Some(Cart {
            user_id: user_id.to_string(),
            items: vec![retail_order_engine::db_types::CartItem {
                product_id: "widget".into(),
                quantity: 3,
                name: "Widget".to_string(),
                price: ros_common::Money::from_cents(1_99),
                image: None,
            }],
            updated_at: Utc::now(),
        }))
    });
    store.expect_fetch_product().returning(|id| Ok(Some(product_fixture(id, 5))));
    // 3 in the cart + 4 from the guest cart, clamped to the 5 in stock.
    let req = as_user(post_json("/cart/merge", &json!({"items": [{"product": "widget", "quantity": 4}]})), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("\"quantity\":5"), "body: {body}");
}

#[actix_web::test]
async fn cart_routes_require_authentication() {
    let store = MockStore::new();
    let (status, _) = send_request(get("/cart"), configure(store)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
