use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use ros_common::Money;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::GatewayConfig,
    data_objects::{NewPaymentIntent, PaymentIntent},
    GatewayApiError,
};

/// Thin REST client for the payment gateway.
///
/// Calls carry the configured timeout and no internal retry; a timeout or transport failure is
/// surfaced as a recoverable [`GatewayApiError`] for the caller to deal with.
#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.api_key.reveal());
        let val =
            HeaderValue::from_str(&bearer).map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("🌐️ Sending gateway request: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                GatewayApiError::Timeout(e.to_string())
            } else {
                GatewayApiError::ResponseError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("🌐️ Gateway request successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::ResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    /// Asks the gateway to open a payment intent over `amount`, tagged with `order_id` so the
    /// eventual webhook notification can be correlated back to the order.
    pub async fn create_payment_intent(
        &self,
        order_id: &str,
        amount: Money,
    ) -> Result<PaymentIntent, GatewayApiError> {
        let body = NewPaymentIntent::for_order(order_id, amount);
        debug!("🌐️ Creating payment intent of {amount} for order {order_id}");
        let intent: PaymentIntent =
            self.rest_query(Method::POST, "/v1/payment_intents", Some(body)).await?;
        info!("🌐️ Payment intent {} created for order {order_id}", intent.id);
        Ok(intent)
    }
}
