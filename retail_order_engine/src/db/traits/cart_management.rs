use thiserror::Error;

use crate::db_types::{Cart, CartItem, ProductId};

#[derive(Debug, Clone, Error)]
pub enum CartError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(ProductId),
    #[error("No cart exists for user {0}")]
    CartNotFound(String),
    #[error("Product {0} is not in the cart")]
    ItemNotFound(ProductId),
}

impl From<sqlx::Error> for CartError {
    fn from(e: sqlx::Error) -> Self {
        CartError::DatabaseError(e.to_string())
    }
}

/// Per-user cart persistence. One cart per user; the whole item set is replaced on every
/// write and the cart's timestamp is touched explicitly at the write site.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    /// Fetches the user's cart with its items, or `None` if the user has never had one.
    async fn fetch_cart(&self, user_id: &str) -> Result<Option<Cart>, CartError>;

    /// Creates the cart if needed, replaces its items with `items`, touches the
    /// last-updated timestamp, and returns the stored cart.
    async fn upsert_cart(&self, user_id: &str, items: &[CartItem]) -> Result<Cart, CartError>;
}
