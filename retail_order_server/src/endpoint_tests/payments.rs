use actix_web::{http::StatusCode, test, web, web::ServiceConfig};
use gateway_tools::{helpers::calculate_hmac, WEBHOOK_SIGNATURE_HEADER};
use retail_order_engine::{MarkPaidOutcome, PaymentFlowApi};
use ros_common::Secret;
use serde_json::json;

use super::{
    helpers::{as_user, post_json, send_request},
    mocks::{order_fixture, test_gateway_client, MockStore},
};
use crate::{
    gateway_routes::{gateway_webhook, CreatePaymentIntentRoute},
    middleware::SignatureMiddlewareFactory,
};

const TEST_WEBHOOK_SECRET: &str = "whsec_endpoint_tests";

fn configure(store: MockStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let api = PaymentFlowApi::new(store, test_gateway_client());
        let webhook = web::resource("/orders/webhook")
            .wrap(SignatureMiddlewareFactory::new(
                WEBHOOK_SIGNATURE_HEADER,
                Secret::new(TEST_WEBHOOK_SECRET.to_string()),
            ))
            .route(web::post().to(gateway_webhook::<MockStore>));
        cfg.app_data(web::Data::new(api)).service(webhook).service(CreatePaymentIntentRoute::<MockStore>::new());
    }
}

fn success_event(order_id: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "id": "evt_1",
        "type": "payment_intent.succeeded",
        "data": {"object": {"id": "pi_1", "amount": 199, "metadata": {"order_id": order_id}}}
    }))
    .unwrap()
}

fn signed_webhook(body: Vec<u8>, secret: &str) -> test::TestRequest {
    let signature = calculate_hmac(secret, &body);
    test::TestRequest::post()
        .uri("/orders/webhook")
        .insert_header((WEBHOOK_SIGNATURE_HEADER, signature))
        .insert_header(("content-type", "application/json"))
        .set_payload(body)
}

#[actix_web::test]
async fn intent_creation_for_unknown_order_is_404() {
    let mut store = MockStore::new();
    store.expect_fetch_order().returning(|_| Ok(None));
    let req = as_user(post_json("/orders/create-payment-intent", &json!({"orderId": "ghost"})), "alice");
    let (status, _) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn intent_creation_for_paid_order_is_refused() {
    let mut store = MockStore::new();
    store.expect_fetch_order().returning(|oid| Ok(Some(order_fixture(oid.as_str(), "alice", true))));
    let req = as_user(post_json("/orders/create-payment-intent", &json!({"orderId": "o-1"})), "alice");
    let (status, body) = send_request(req, configure(store)).await;
    // The already-paid guard fires before any gateway call is attempted.
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already been paid"), "body: {body}");
}

#[actix_web::test]
async fn webhook_with_valid_signature_marks_the_order_paid() {
    let mut store = MockStore::new();
    store
        .expect_mark_order_paid()
        .times(1)
        .withf(|oid, _| oid.as_str() == "o-1")
        .returning(|oid, _| Ok(MarkPaidOutcome::Paid(order_fixture(oid.as_str(), "alice", true))));
    let req = signed_webhook(success_event("o-1"), TEST_WEBHOOK_SECRET);
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"received\":true}");
}

#[actix_web::test]
async fn webhook_with_invalid_signature_is_rejected_without_state_change() {
    // No expectations on the mock: any call to mark_order_paid would panic the test.
    let store = MockStore::new();
    let req = signed_webhook(success_event("o-1"), "whsec_wrong");
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Invalid webhook signature"), "body: {body}");
}

#[actix_web::test]
async fn webhook_without_signature_is_rejected() {
    let store = MockStore::new();
    let req = test::TestRequest::post()
        .uri("/orders/webhook")
        .insert_header(("content-type", "application/json"))
        .set_payload(success_event("o-1"));
    let (status, _) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn webhook_acknowledges_unknown_orders() {
    let mut store = MockStore::new();
    store.expect_mark_order_paid().returning(|_, _| Ok(MarkPaidOutcome::NotFound));
    let req = signed_webhook(success_event("ghost"), TEST_WEBHOOK_SECRET);
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"received\":true}");
}

#[actix_web::test]
async fn webhook_ignores_other_event_types() {
    // mark_order_paid must not be called for a non-success event.
    let store = MockStore::new();
    let body = serde_json::to_vec(&json!({
        "id": "evt_2",
        "type": "payment_intent.created",
        "data": {"object": {"id": "pi_1", "metadata": {"order_id": "o-1"}}}
    }))
    .unwrap();
    let req = signed_webhook(body, TEST_WEBHOOK_SECRET);
    let (status, body) = send_request(req, configure(store)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "{\"received\":true}");
}
