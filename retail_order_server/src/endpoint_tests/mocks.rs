use chrono::{DateTime, TimeZone, Utc};
use gateway_tools::{GatewayApi, GatewayConfig};
use mockall::mock;
use retail_order_engine::{
    db_types::{
        Cart,
        CartItem,
        Money,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        OrderStatusType,
        OrderUpdate,
        Product,
        ProductId,
        ShippingAddress,
    },
    CartError,
    CartManagement,
    InventoryError,
    InventoryManagement,
    MarkPaidOutcome,
    OrderApiError,
    OrderManagement,
    StockDecrement,
};

use crate::integrations::gateway::GatewayClient;

mock! {
    pub Store {}

    impl InventoryManagement for Store {
        async fn decrement_stock(&self, product_id: &ProductId, quantity: i64) -> Result<StockDecrement, InventoryError>;
        async fn restore_stock(&self, product_id: &ProductId, quantity: i64) -> Result<(), InventoryError>;
        async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<Product>, InventoryError>;
    }

    impl OrderManagement for Store {
        async fn insert_order(&self, order: &NewOrder, items: &[OrderItem]) -> Result<Order, OrderApiError>;
        async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderApiError>;
        async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError>;
        async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderApiError>;
        async fn update_order(&self, order_id: &OrderId, update: OrderUpdate) -> Result<Option<Order>, OrderApiError>;
        async fn mark_order_paid(&self, order_id: &OrderId, paid_at: DateTime<Utc>) -> Result<MarkPaidOutcome, OrderApiError>;
    }

    impl CartManagement for Store {
        async fn fetch_cart(&self, user_id: &str) -> Result<Option<Cart>, CartError>;
        async fn upsert_cart(&self, user_id: &str, items: &[CartItem]) -> Result<Cart, CartError>;
    }
}

/// A gateway client pointed at a placeholder url. Tests that reach the gateway would
/// fail loudly; the interesting tests never get that far.
pub fn test_gateway_client() -> GatewayClient {
    GatewayClient::new(GatewayApi::new(GatewayConfig::default()).expect("client builds"))
}

pub fn shipping_fixture() -> ShippingAddress {
    ShippingAddress {
        address: "1 Main Road".to_string(),
        city: "Cape Town".to_string(),
        postal_code: "8001".to_string(),
        country: "ZA".to_string(),
    }
}

pub fn product_fixture(id: &ProductId, stock: i64) -> Product {
    Product {
        id: id.clone(),
        name: format!("Product {id}"),
        description: None,
        price: Money::from_cents(1_99),
        stock,
        image: None,
        created_at: Utc.with_ymd_and_hms(2025, 2, 28, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 2, 28, 13, 30, 0).unwrap(),
    }
}

pub fn order_fixture(order_id: &str, user_id: &str, is_paid: bool) -> Order {
    Order {
        id: 1,
        order_id: OrderId(order_id.to_string()),
        user_id: user_id.to_string(),
        items: vec![OrderItem {
            product_id: ProductId::from("widget"),
            quantity: 1,
            name: "Widget".to_string(),
            price: Money::from_cents(1_99),
            image: None,
        }],
        shipping: shipping_fixture(),
        total_price: Money::from_cents(1_99),
        payment_method: "card".to_string(),
        is_paid,
        paid_at: is_paid.then(|| Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap()),
        status: if is_paid { OrderStatusType::Processing } else { OrderStatusType::Pending },
        created_at: Utc.with_ymd_and_hms(2025, 2, 28, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 2, 28, 13, 30, 0).unwrap(),
    }
}

/// What the store would hand back after persisting `order` with `items`.
pub fn stored_order(order: &NewOrder, items: &[OrderItem]) -> Order {
    Order {
        id: 1,
        order_id: order.order_id.clone(),
        user_id: order.user_id.clone(),
        items: items.to_vec(),
        shipping: order.shipping.clone(),
        total_price: order.total_price,
        payment_method: order.payment_method.clone(),
        is_paid: false,
        paid_at: None,
        status: OrderStatusType::Pending,
        created_at: Utc.with_ymd_and_hms(2025, 2, 28, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2025, 2, 28, 13, 30, 0).unwrap(),
    }
}
