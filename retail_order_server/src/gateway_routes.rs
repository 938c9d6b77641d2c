//! Payment gateway routes: intent creation (outbound) and the webhook (inbound).
//!
//! Webhook requests only reach the handler after the signature middleware has verified
//! the raw body (see [`crate::middleware::SignatureMiddlewareFactory`]); by the time the
//! JSON extractor runs here, the bytes are known to be authentic. Verified events are
//! always acknowledged with 200, whatever we do with them; a non-2xx answer would make
//! the gateway retry an event it can never deliver more successfully.

use actix_web::{web, HttpResponse};
use chrono::Utc;
use gateway_tools::GatewayEvent;
use log::*;
use retail_order_engine::{db_types::OrderId, OrderManagement, PaymentFlowApi};

use crate::{
    auth::AuthenticatedUser,
    data_objects::{PaymentIntentRequest, PaymentIntentResponse, WebhookAck},
    errors::ServerError,
    integrations::gateway::GatewayClient,
    route,
};

route!(create_payment_intent => Post "/orders/create-payment-intent" impl OrderManagement);
/// Asks the gateway for a payment intent over the order's total and returns the
/// client-facing secret. Refused with 409 if the order is already paid, before any
/// gateway call is made.
pub async fn create_payment_intent<A>(
    user: AuthenticatedUser,
    body: web::Json<PaymentIntentRequest>,
    api: web::Data<PaymentFlowApi<A, GatewayClient>>,
) -> Result<HttpResponse, ServerError>
where A: OrderManagement
{
    let order_id = body.into_inner().order_id;
    debug!("💻️ POST create payment intent for order {order_id} (user {})", user.user_id);
    let intent = api.create_payment_intent(&order_id).await?;
    Ok(HttpResponse::Ok().json(PaymentIntentResponse { client_secret: intent.client_secret }))
}

/// The webhook handler. Registered manually in the server wiring so the signature
/// middleware can be attached to exactly this route.
pub async fn gateway_webhook<A>(
    body: web::Json<GatewayEvent>,
    api: web::Data<PaymentFlowApi<A, GatewayClient>>,
) -> Result<HttpResponse, ServerError>
where A: OrderManagement
{
    let event = body.into_inner();
    if event.is_payment_success() {
        match event.order_id() {
            Some(order_id) => {
                let order_id = OrderId(order_id.to_string());
                // Unknown orders and duplicate deliveries are resolved inside the engine;
                // both outcomes are acknowledged below.
                api.confirm_order_paid(&order_id, Utc::now()).await?;
            },
            None => {
                warn!("💻️ Payment success event {} carries no order id. Acknowledging anyway.", event.id);
            },
        }
    } else {
        trace!("💻️ Ignoring gateway event {} of type {}", event.id, event.event_type);
    }
    Ok(HttpResponse::Ok().json(WebhookAck::ok()))
}
