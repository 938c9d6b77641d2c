use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::{carts, db_url, inventory, new_pool, orders};
use crate::{
    db::traits::{
        CartError,
        CartManagement,
        InventoryError,
        InventoryManagement,
        MarkPaidOutcome,
        OrderApiError,
        OrderManagement,
        StockDecrement,
    },
    db_types::{Cart, CartItem, Money, NewOrder, Order, OrderId, OrderItem, OrderUpdate, Product, ProductId},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the url from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Applies any pending schema migrations. Idempotent; call once at startup.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Inserts or replaces a product record. Product CRUD belongs to the catalog
    /// collaborator; this is the seeding/testing entry point.
    pub async fn upsert_product(
        &self,
        product_id: &ProductId,
        name: &str,
        price: Money,
        stock: i64,
    ) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::upsert_product(product_id, name, price, stock, &mut conn).await
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn decrement_stock(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<StockDecrement, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::decrement_stock(product_id, quantity, &mut conn).await
    }

    async fn restore_stock(&self, product_id: &ProductId, quantity: i64) -> Result<(), InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::restore_stock(product_id, quantity, &mut conn).await
    }

    async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<Product>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        inventory::fetch_product(product_id, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    /// The order row and its line items are written in one transaction: the order is a
    /// single aggregate and must never be visible half-written. Note that this
    /// transaction contains no stock updates; reservation happened before we got here.
    async fn insert_order(&self, order: &NewOrder, items: &[OrderItem]) -> Result<Order, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        orders::insert_order(order, items, &mut tx).await?;
        let stored = orders::fetch_order_by_order_id(&order.order_id, &mut tx)
            .await?
            .ok_or_else(|| OrderApiError::OrderNotFound(order.order_id.clone()))?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders(Some(user_id), &mut conn).await
    }

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders(None, &mut conn).await
    }

    async fn update_order(
        &self,
        order_id: &OrderId,
        update: OrderUpdate,
    ) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        trace!("🗃️ Order {order_id} updating with new values: {update:?}");
        orders::update_order(order_id, &update, &mut conn).await?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn mark_order_paid(
        &self,
        order_id: &OrderId,
        paid_at: DateTime<Utc>,
    ) -> Result<MarkPaidOutcome, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::mark_order_paid(order_id, paid_at, &mut conn).await
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, user_id: &str) -> Result<Option<Cart>, CartError> {
        let mut conn = self.pool.acquire().await?;
        carts::fetch_cart(user_id, &mut conn).await
    }

    async fn upsert_cart(&self, user_id: &str, items: &[CartItem]) -> Result<Cart, CartError> {
        let mut tx = self.pool.begin().await?;
        carts::upsert_cart(user_id, items, &mut tx).await?;
        let cart = carts::fetch_cart(user_id, &mut tx)
            .await?
            .ok_or_else(|| CartError::CartNotFound(user_id.to_string()))?;
        tx.commit().await?;
        Ok(cart)
    }
}
