//! Adapter between the engine's gateway contract and the concrete gateway client.

use gateway_tools::{GatewayApi, GatewayApiError};
use log::debug;
use retail_order_engine::{
    db_types::{Money, OrderId},
    GatewayError,
    PaymentGatewayClient,
    PaymentIntent,
};

/// Wraps [`GatewayApi`] so the engine's [`PaymentFlowApi`] can drive intent creation
/// without knowing anything about HTTP or the gateway's wire types.
///
/// [`PaymentFlowApi`]: retail_order_engine::PaymentFlowApi
#[derive(Clone)]
pub struct GatewayClient {
    api: GatewayApi,
}

impl GatewayClient {
    pub fn new(api: GatewayApi) -> Self {
        Self { api }
    }
}

impl PaymentGatewayClient for GatewayClient {
    async fn create_intent(&self, order_id: &OrderId, amount: Money) -> Result<PaymentIntent, GatewayError> {
        let intent = self.api.create_payment_intent(order_id.as_str(), amount).await.map_err(|e| match e {
            GatewayApiError::JsonError(e) => GatewayError::InvalidResponse(e),
            other => GatewayError::RequestFailed(other.to_string()),
        })?;
        debug!("💳️ Gateway issued intent {} for order {order_id}", intent.id);
        Ok(PaymentIntent { id: intent.id, client_secret: intent.client_secret })
    }
}
