use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;

use crate::{
    db::traits::{
        MarkPaidOutcome,
        OrderManagement,
        PaymentApiError,
        PaymentGatewayClient,
        PaymentIntent,
    },
    db_types::OrderId,
};

/// `PaymentFlowApi` drives the payment side of an order's life: creating gateway intents
/// and applying the gateway's success notifications to the order record.
///
/// The state machine is small and strictly forward: unpaid, intent created (gateway-side
/// state we never store), paid. `Paid` is idempotent-entry; everything here is written
/// assuming the gateway delivers every event at least once and in any order.
pub struct PaymentFlowApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for PaymentFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, G> PaymentFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> PaymentFlowApi<B, G>
where
    B: OrderManagement,
    G: PaymentGatewayClient,
{
    /// Creates a payment intent for the order and returns the client-facing handle.
    ///
    /// Fails with `OrderNotFound` for unknown orders and `AlreadyPaid` for orders that
    /// are already settled; the latter guard runs *before* the gateway call, so duplicate
    /// intent requests never open a second charge.
    pub async fn create_payment_intent(&self, order_id: &OrderId) -> Result<PaymentIntent, PaymentApiError> {
        let order = self
            .db
            .fetch_order(order_id)
            .await?
            .ok_or_else(|| PaymentApiError::OrderNotFound(order_id.clone()))?;
        if order.is_paid {
            info!("💳️ Intent requested for already-paid order {order_id}. Refusing.");
            return Err(PaymentApiError::AlreadyPaid(order_id.clone()));
        }
        let intent = self.gateway.create_intent(order_id, order.total_price).await?;
        debug!("💳️ Intent {} created for order {order_id} over {}", intent.id, order.total_price);
        Ok(intent)
    }

    /// Applies a verified "payment succeeded" notification to the order.
    ///
    /// The paid transition is conditional at the storage layer, so a duplicate delivery
    /// finds nothing to do and the original `paid_at` survives. An unknown order is
    /// reported as [`MarkPaidOutcome::NotFound`] rather than an error; the caller
    /// acknowledges it, because the gateway would otherwise retry forever on an event we
    /// can never resolve.
    pub async fn confirm_order_paid(
        &self,
        order_id: &OrderId,
        paid_at: DateTime<Utc>,
    ) -> Result<MarkPaidOutcome, PaymentApiError> {
        let outcome = self.db.mark_order_paid(order_id, paid_at).await?;
        match &outcome {
            MarkPaidOutcome::Paid(order) => {
                info!("💳️ Order {order_id} is now paid (status {})", order.status);
            },
            MarkPaidOutcome::AlreadyPaid(_) => {
                debug!("💳️ Order {order_id} was already paid. Duplicate notification ignored.");
            },
            MarkPaidOutcome::NotFound => {
                warn!("💳️ Payment notification for unknown order {order_id}. Acknowledging without action.");
            },
        }
        Ok(outcome)
    }
}
