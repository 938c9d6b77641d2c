use std::collections::HashMap;

use ros_common::Money;
use serde::{Deserialize, Serialize};

/// Header carrying the base64 HMAC-SHA256 signature of the raw webhook body.
pub const WEBHOOK_SIGNATURE_HEADER: &str = "x-gateway-hmac-sha256";

/// Event type emitted by the gateway when a payment intent settles successfully.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Metadata key under which we store the order id when creating an intent, so that
/// webhook events can be correlated back to an order.
pub const ORDER_ID_METADATA_KEY: &str = "order_id";

/// A payment intent as returned by the gateway. The `client_secret` is handed to the
/// storefront client; the `id` is only useful for support and log correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: Money,
    pub currency: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Request body for intent creation.
#[derive(Debug, Clone, Serialize)]
pub struct NewPaymentIntent {
    pub amount: Money,
    pub currency: String,
    pub metadata: HashMap<String, String>,
}

impl NewPaymentIntent {
    pub fn for_order(order_id: &str, amount: Money) -> Self {
        let metadata = HashMap::from([(ORDER_ID_METADATA_KEY.to_string(), order_id.to_string())]);
        Self { amount, currency: "usd".to_string(), metadata }
    }
}

/// A webhook event as delivered by the gateway.
///
/// The gateway delivers events at least once and in no particular order, so consumers must
/// treat every event as potentially a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: GatewayEventData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEventData {
    pub object: GatewayEventObject,
}

/// The intent snapshot embedded in a webhook event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEventObject {
    pub id: String,
    #[serde(default)]
    pub amount: Option<Money>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl GatewayEvent {
    pub fn is_payment_success(&self) -> bool {
        self.event_type == EVENT_PAYMENT_SUCCEEDED
    }

    /// The order id the gateway was asked to tag the intent with, if present.
    pub fn order_id(&self) -> Option<&str> {
        self.data.object.metadata.get(ORDER_ID_METADATA_KEY).map(String::as_str)
    }
}
