use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::traits::{InventoryError, MarkPaidOutcome};
use crate::db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType, OrderUpdate, ProductId};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Cannot insert order, since it already exists with id {0}")]
    OrderAlreadyExists(OrderId),
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("An order must contain at least one line item")]
    EmptyOrder,
    #[error("Invalid quantity {quantity} for product {product_id}. Quantities must be at least 1")]
    InvalidQuantity { product_id: ProductId, quantity: i64 },
    #[error("Order status may not move from {from} to {to}")]
    OrderModificationForbidden { from: OrderStatusType, to: OrderStatusType },
    #[error("Order {0} is paid; the payment flag cannot be cleared")]
    PaymentFlagRegression(OrderId),
    #[error("{0}")]
    Inventory(#[from] InventoryError),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

/// The durable order aggregate.
///
/// Orders are inserted once, mutated only by payment reconciliation and the
/// administrative update path, and never deleted.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Persists a new order (status `Pending`, unpaid) together with its snapshotted line
    /// items, and returns the stored record. Fails with
    /// [`OrderApiError::OrderAlreadyExists`] if the order id is taken.
    async fn insert_order(&self, order: &NewOrder, items: &[OrderItem]) -> Result<Order, OrderApiError>;

    /// Fetches a single order with its line items, or `None`.
    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderApiError>;

    /// All orders belonging to `user_id`, most recent first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError>;

    /// Every order in the store, most recent first. Administrative scope.
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderApiError>;

    /// Applies an [`OrderUpdate`] and returns the updated order, or `None` if the order
    /// does not exist. Validation of the transition happens above this layer.
    async fn update_order(&self, order_id: &OrderId, update: OrderUpdate) -> Result<Option<Order>, OrderApiError>;

    /// Conditionally marks the order paid: sets `is_paid`, `paid_at` and advances a
    /// `Pending` status to `Processing`, all only if the order is not yet paid. The
    /// condition must be evaluated in the same storage statement as the write, so that
    /// duplicate webhook deliveries can never double-apply.
    async fn mark_order_paid(
        &self,
        order_id: &OrderId,
        paid_at: DateTime<Utc>,
    ) -> Result<MarkPaidOutcome, OrderApiError>;
}
