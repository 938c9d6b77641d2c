use thiserror::Error;

use crate::db::traits::{OrderApiError, PaymentIntent};
use crate::db_types::{Money, OrderId};

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The call did not complete (transport failure, timeout, non-2xx response).
    /// Retryable from the caller's point of view.
    #[error("Payment gateway request failed: {0}")]
    RequestFailed(String),
    #[error("Payment gateway returned an unusable response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Error)]
pub enum PaymentApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Order {0} has already been paid")]
    AlreadyPaid(OrderId),
    #[error("{0}")]
    Gateway(#[from] GatewayError),
}

impl From<OrderApiError> for PaymentApiError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::OrderNotFound(oid) => PaymentApiError::OrderNotFound(oid),
            other => PaymentApiError::DatabaseError(other.to_string()),
        }
    }
}

/// Outbound contract with the payment gateway.
///
/// One call, no internal retry: intent creation either returns a handle or a retryable
/// [`GatewayError`]. The webhook side of the gateway contract enters through the HTTP
/// boundary, not through this trait.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayClient {
    /// Creates a payment intent over `amount`, tagged with `order_id` as correlation
    /// metadata so the gateway's webhook can be resolved back to the order.
    async fn create_intent(&self, order_id: &OrderId, amount: Money) -> Result<PaymentIntent, GatewayError>;
}
