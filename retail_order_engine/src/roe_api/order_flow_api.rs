use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db::traits::{InventoryError, InventoryManagement, OrderApiError, OrderManagement},
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderUpdate},
    roe_api::inventory_api::InventoryApi,
};

/// `OrderFlowApi` is the order placement orchestrator: it coordinates the inventory
/// ledger and the order store so that an order either exists with all of its stock
/// reserved, or does not exist and no stock has moved.
pub struct OrderFlowApi<B> {
    inventory: InventoryApi<B>,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { inventory: InventoryApi::new(db) }
    }

    pub fn db(&self) -> &B {
        self.inventory.db()
    }

    pub fn inventory(&self) -> &InventoryApi<B> {
        &self.inventory
    }
}

impl<B> OrderFlowApi<B>
where B: InventoryManagement + OrderManagement
{
    /// Places a new order.
    ///
    /// The flow is: validate the request, snapshot product details, reserve stock
    /// (all-or-nothing, see [`InventoryApi::reserve`]), persist the order. If persistence
    /// fails after the reservation committed, the reservation is released before the
    /// error propagates; inventory is never silently consumed without an order to show
    /// for it.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, OrderApiError> {
        if order.items.is_empty() {
            return Err(OrderApiError::EmptyOrder);
        }
        for item in &order.items {
            if item.quantity < 1 {
                return Err(OrderApiError::InvalidQuantity {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                });
            }
        }
        // Snapshot name/price/image at order time, so later catalog edits do not rewrite
        // order history. The snapshot read is advisory; the reservation below is the only
        // stock check that counts.
        let mut snapshots = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product = self
                .db()
                .fetch_product(&item.product_id)
                .await?
                .ok_or_else(|| InventoryError::ProductNotFound(item.product_id.clone()))?;
            snapshots.push(OrderItem {
                product_id: product.id,
                quantity: item.quantity,
                name: product.name,
                price: product.price,
                image: product.image,
            });
        }
        let mut reservation = self.inventory.reserve(&order.items).await?;
        match self.db().insert_order(&order, &snapshots).await {
            Ok(stored) => {
                info!(
                    "🧾️ Order {} placed for user {} with {} line items, total {}",
                    stored.order_id,
                    stored.user_id,
                    stored.items.len(),
                    stored.total_price
                );
                Ok(stored)
            },
            Err(e) => {
                warn!(
                    "🧾️ Could not persist order {} after its stock was reserved. Releasing the reservation. {e}",
                    order.order_id
                );
                self.inventory.release(&mut reservation).await;
                Err(e)
            },
        }
    }

    /// The orders belonging to one user, most recent first.
    pub async fn orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError> {
        self.db().fetch_orders_for_user(user_id).await
    }

    /// Every order in the store, most recent first. Administrative scope; the caller is
    /// responsible for having checked authorization.
    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderApiError> {
        self.db().fetch_all_orders().await
    }

    pub async fn order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderApiError> {
        self.db().fetch_order(order_id).await
    }

    /// Administrative status/payment correction. This path bypasses the payment gateway
    /// flow and never touches inventory; it exists for manual fixes.
    ///
    /// The lifecycle rules still hold: the status may only move forward (with `Cancelled`
    /// reachable from any non-terminal state), and a paid order can not be made unpaid.
    /// Setting the current status again is accepted as a no-op.
    pub async fn admin_update_order(
        &self,
        order_id: &OrderId,
        mut update: OrderUpdate,
    ) -> Result<Order, OrderApiError> {
        let order =
            self.db().fetch_order(order_id).await?.ok_or_else(|| OrderApiError::OrderNotFound(order_id.clone()))?;
        if let Some(new_status) = update.status {
            if new_status == order.status {
                update.status = None;
            } else if !order.status.can_transition_to(new_status) {
                return Err(OrderApiError::OrderModificationForbidden { from: order.status, to: new_status });
            }
        }
        match update.is_paid {
            Some(false) if order.is_paid => {
                return Err(OrderApiError::PaymentFlagRegression(order_id.clone()));
            },
            Some(true) if !order.is_paid => {
                update.paid_at = Some(Utc::now());
            },
            // Re-asserting the current payment flag changes nothing.
            Some(_) => {
                update.is_paid = None;
            },
            None => {},
        }
        let updated = self
            .db()
            .update_order(order_id, update)
            .await?
            .ok_or_else(|| OrderApiError::OrderNotFound(order_id.clone()))?;
        info!("🧾️ Order {order_id} updated by admin: status {}, paid: {}", updated.status, updated.is_paid);
        Ok(updated)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        db_types::{LineItemRequest, Money, NewOrder, OrderStatusType, OrderUpdate},
        test_utils::{prepare_test_db, seed_product, stock_of, test_address},
        InventoryError,
        OrderApiError,
        OrderFlowApi,
        OrderManagement,
    };

    fn order_for(user: &str, items: Vec<LineItemRequest>, total: i64) -> NewOrder {
        NewOrder::new(user, items, test_address(), Money::from_cents(total))
    }

    #[tokio::test]
    async fn placing_an_order_reserves_stock_and_snapshots_products() {
        let db = prepare_test_db().await;
        seed_product(&db, "widget", "Widget", 1_99, 10).await;
        seed_product(&db, "gadget", "Gadget", 10_00, 4).await;
        let api = OrderFlowApi::new(db.clone());
        let new_order =
            order_for("alice", vec![LineItemRequest::new("widget", 2), LineItemRequest::new("gadget", 1)], 13_98);
        let order = api.create_order(new_order).await.expect("order should be placed");
        assert_eq!(order.user_id, "alice");
        assert_eq!(order.status, OrderStatusType::Pending);
        assert!(!order.is_paid);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.items[0].name, "Widget");
        assert_eq!(order.items[0].price, Money::from_cents(1_99));
        assert_eq!(stock_of(&db, "widget").await, 8);
        assert_eq!(stock_of(&db, "gadget").await, 3);
    }

    #[tokio::test]
    async fn empty_orders_are_rejected() {
        let db = prepare_test_db().await;
        let api = OrderFlowApi::new(db);
        let err = api.create_order(order_for("alice", vec![], 0)).await.expect_err("empty order");
        assert!(matches!(err, OrderApiError::EmptyOrder));
    }

    #[tokio::test]
    async fn zero_quantities_are_rejected() {
        let db = prepare_test_db().await;
        seed_product(&db, "widget", "Widget", 1_99, 10).await;
        let api = OrderFlowApi::new(db);
        let err = api
            .create_order(order_for("alice", vec![LineItemRequest::new("widget", 0)], 0))
            .await
            .expect_err("zero quantity");
        assert!(matches!(err, OrderApiError::InvalidQuantity { .. }));
    }

    #[tokio::test]
    async fn failed_orders_leave_no_partial_stock_effect() {
        let db = prepare_test_db().await;
        seed_product(&db, "widget", "Widget", 1_99, 10).await;
        seed_product(&db, "gadget", "Gadget", 10_00, 0).await;
        let api = OrderFlowApi::new(db.clone());
        let new_order =
            order_for("alice", vec![LineItemRequest::new("widget", 2), LineItemRequest::new("gadget", 1)], 13_98);
        let err = api.create_order(new_order).await.expect_err("gadget is out of stock");
        assert!(matches!(err, OrderApiError::Inventory(InventoryError::InsufficientStock { .. })));
        assert_eq!(stock_of(&db, "widget").await, 10);
        assert!(api.orders_for_user("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persistence_failure_releases_the_reservation() {
        let db = prepare_test_db().await;
        seed_product(&db, "widget", "Widget", 1_99, 10).await;
        let api = OrderFlowApi::new(db.clone());
        let first = order_for("alice", vec![LineItemRequest::new("widget", 1)], 1_99);
        let order_id = first.order_id.clone();
        api.create_order(first).await.expect("first order");
        assert_eq!(stock_of(&db, "widget").await, 9);
        // Force the insert to fail after reservation by reusing the same order id.
        let duplicate = order_for("bob", vec![LineItemRequest::new("widget", 5)], 9_95).with_order_id(order_id);
        let err = api.create_order(duplicate).await.expect_err("duplicate order id");
        assert!(matches!(err, OrderApiError::OrderAlreadyExists(_)));
        // The failed order's reservation must have been compensated.
        assert_eq!(stock_of(&db, "widget").await, 9);
    }

    #[tokio::test]
    async fn concurrent_orders_for_the_last_unit_produce_one_order() {
        let db = prepare_test_db().await;
        seed_product(&db, "widget", "Widget", 1_99, 1).await;
        let api_a = OrderFlowApi::new(db.clone());
        let api_b = OrderFlowApi::new(db.clone());
        let a = order_for("alice", vec![LineItemRequest::new("widget", 1)], 1_99);
        let b = order_for("bob", vec![LineItemRequest::new("widget", 1)], 1_99);
        let (res_a, res_b) = tokio::join!(api_a.create_order(a), api_b.create_order(b));
        let successes = [res_a.is_ok(), res_b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(successes, 1);
        assert_eq!(stock_of(&db, "widget").await, 0);
        let total_orders = api_a.all_orders().await.unwrap().len();
        assert_eq!(total_orders, 1);
    }

    #[tokio::test]
    async fn listings_are_newest_first_and_scoped() {
        let db = prepare_test_db().await;
        seed_product(&db, "widget", "Widget", 1_99, 100).await;
        let api = OrderFlowApi::new(db.clone());
        let first = api.create_order(order_for("alice", vec![LineItemRequest::new("widget", 1)], 1_99)).await.unwrap();
        let second = api.create_order(order_for("alice", vec![LineItemRequest::new("widget", 2)], 3_98)).await.unwrap();
        api.create_order(order_for("bob", vec![LineItemRequest::new("widget", 1)], 1_99)).await.unwrap();
        let mine = api.orders_for_user("alice").await.unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].order_id, second.order_id);
        assert_eq!(mine[1].order_id, first.order_id);
        assert_eq!(api.all_orders().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn admin_updates_respect_the_lifecycle() {
        let db = prepare_test_db().await;
        seed_product(&db, "widget", "Widget", 1_99, 10).await;
        let api = OrderFlowApi::new(db.clone());
        let order = api.create_order(order_for("alice", vec![LineItemRequest::new("widget", 1)], 1_99)).await.unwrap();
        let updated = api
            .admin_update_order(&order.order_id, OrderUpdate::default().with_paid(true).with_status(OrderStatusType::Shipped))
            .await
            .expect("admin update");
        assert!(updated.is_paid);
        assert!(updated.paid_at.is_some());
        assert_eq!(updated.status, OrderStatusType::Shipped);
        // Regressions are refused.
        let err = api
            .admin_update_order(&order.order_id, OrderUpdate::default().with_status(OrderStatusType::Pending))
            .await
            .expect_err("status regression");
        assert!(matches!(err, OrderApiError::OrderModificationForbidden { .. }));
        let err = api
            .admin_update_order(&order.order_id, OrderUpdate::default().with_paid(false))
            .await
            .expect_err("payment flag regression");
        assert!(matches!(err, OrderApiError::PaymentFlagRegression(_)));
        // The stored record is unchanged by the refused updates.
        let stored = api.db().fetch_order(&order.order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatusType::Shipped);
        assert!(stored.is_paid);
    }
}
