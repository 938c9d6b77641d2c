use thiserror::Error;

use crate::db::traits::StockDecrement;
use crate::db_types::{Product, ProductId};

#[derive(Debug, Clone, Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock { product_id: ProductId, available: i64, requested: i64 },
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        InventoryError::DatabaseError(e.to_string())
    }
}

/// Storage-level stock primitives.
///
/// The only way the engine ever changes a stock count is through these two methods, and
/// `decrement_stock` must be implemented as **one** conditional statement at the storage
/// layer ("decrement by n only if stock >= n"). A read followed by a write is a race that
/// oversells under concurrent load and is not an acceptable implementation.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    /// Atomically decrements the product's stock by `quantity` if at least `quantity`
    /// units are available. Never partially applies.
    async fn decrement_stock(
        &self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<StockDecrement, InventoryError>;

    /// Adds `quantity` units back onto the product's stock. Used for compensation when a
    /// multi-item reservation fails partway, or when a reservation is released.
    async fn restore_stock(&self, product_id: &ProductId, quantity: i64) -> Result<(), InventoryError>;

    /// Fetches the product record, or `None` if the catalog has no such product.
    async fn fetch_product(&self, product_id: &ProductId) -> Result<Option<Product>, InventoryError>;
}
