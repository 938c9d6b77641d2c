use std::fmt::Debug;

use log::*;

use crate::{
    db::traits::{CartError, CartManagement, InventoryManagement},
    db_types::{Cart, CartItem, NewCartItem, ProductId},
};

/// `CartApi` applies the lenient stock-clamping policy to every cart mutation.
///
/// Where order placement is strict (reserve or fail), carts are best-effort: unknown
/// products are dropped, quantities are silently clamped to what the catalog can satisfy
/// right now, and the caller always gets back a corrected cart instead of an error. The
/// clamp is advisory only; nothing here reserves stock.
pub struct CartApi<B> {
    db: B,
}

impl<B> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi")
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> CartApi<B>
where B: CartManagement + InventoryManagement
{
    /// Fetches the user's cart, creating an empty one on first access.
    pub async fn cart(&self, user_id: &str) -> Result<Cart, CartError> {
        match self.db.fetch_cart(user_id).await? {
            Some(cart) => Ok(cart),
            None => {
                debug!("🛒️ Creating empty cart for user {user_id}");
                self.db.upsert_cart(user_id, &[]).await
            },
        }
    }

    /// Replaces the cart wholesale with the validated form of `items`.
    pub async fn save_cart(&self, user_id: &str, items: Vec<NewCartItem>) -> Result<Cart, CartError> {
        let validated = self.validate_and_clamp(items).await?;
        info!("🛒️ Saving cart for user {user_id} with {} items", validated.len());
        self.db.upsert_cart(user_id, &validated).await
    }

    /// Adds one item. A missing quantity (or zero) counts as one. If the product is
    /// already in the cart the quantities are summed before clamping. Unlike the bulk
    /// operations, a nonexistent product is an error here, because the caller asked for
    /// it specifically.
    pub async fn add_item(&self, user_id: &str, item: NewCartItem) -> Result<Cart, CartError> {
        let product = self
            .db
            .fetch_product(&item.product_id)
            .await
            .map_err(|e| CartError::DatabaseError(e.to_string()))?
            .ok_or_else(|| CartError::ProductNotFound(item.product_id.clone()))?;
        let requested = item.quantity.max(1);
        let mut cart = self.cart(user_id).await?;
        match cart.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = (existing.quantity + requested).min(product.stock);
                existing.name = product.name;
                existing.price = product.price;
                existing.image = product.image;
            },
            None => {
                cart.items.push(CartItem {
                    product_id: product.id,
                    quantity: requested.min(product.stock),
                    name: product.name,
                    price: product.price,
                    image: product.image,
                });
            },
        }
        self.db.upsert_cart(user_id, &cart.items).await
    }

    /// Sets the quantity of an item already in the cart, clamped to current stock, and
    /// refreshes the product snapshot.
    pub async fn update_item(
        &self,
        user_id: &str,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        let mut cart = self
            .db
            .fetch_cart(user_id)
            .await?
            .ok_or_else(|| CartError::CartNotFound(user_id.to_string()))?;
        let item = cart
            .items
            .iter_mut()
            .find(|i| &i.product_id == product_id)
            .ok_or_else(|| CartError::ItemNotFound(product_id.clone()))?;
        let product = self
            .db
            .fetch_product(product_id)
            .await
            .map_err(|e| CartError::DatabaseError(e.to_string()))?
            .ok_or_else(|| CartError::ProductNotFound(product_id.clone()))?;
        item.quantity = quantity.max(1).min(product.stock);
        item.name = product.name;
        item.price = product.price;
        item.image = product.image;
        self.db.upsert_cart(user_id, &cart.items).await
    }

    /// Removes an item. Removing something that is not in the cart is not an error.
    pub async fn remove_item(&self, user_id: &str, product_id: &ProductId) -> Result<Cart, CartError> {
        let mut cart = self
            .db
            .fetch_cart(user_id)
            .await?
            .ok_or_else(|| CartError::CartNotFound(user_id.to_string()))?;
        cart.items.retain(|i| &i.product_id != product_id);
        self.db.upsert_cart(user_id, &cart.items).await
    }

    pub async fn clear(&self, user_id: &str) -> Result<Cart, CartError> {
        let cart = self
            .db
            .fetch_cart(user_id)
            .await?
            .ok_or_else(|| CartError::CartNotFound(user_id.to_string()))?;
        debug!("🛒️ Clearing cart for user {} ({} items)", user_id, cart.items.len());
        self.db.upsert_cart(user_id, &[]).await
    }

    /// Folds a guest cart into the user's cart: quantities for items already present are
    /// summed, then everything is clamped. Unknown products are skipped silently.
    pub async fn merge_guest_cart(&self, user_id: &str, items: Vec<NewCartItem>) -> Result<Cart, CartError> {
        let mut cart = self.cart(user_id).await?;
        for item in items {
            let Some(product) = self
                .db
                .fetch_product(&item.product_id)
                .await
                .map_err(|e| CartError::DatabaseError(e.to_string()))?
            else {
                debug!("🛒️ Skipping unknown product {} while merging guest cart", item.product_id);
                continue;
            };
            match cart.items.iter_mut().find(|i| i.product_id == item.product_id) {
                Some(existing) => {
                    existing.quantity = (existing.quantity + item.quantity).min(product.stock);
                },
                None => {
                    cart.items.push(CartItem {
                        product_id: product.id,
                        quantity: item.quantity.min(product.stock),
                        name: product.name,
                        price: product.price,
                        image: product.image,
                    });
                },
            }
        }
        info!("🛒️ Merged guest cart for user {user_id}; cart now holds {} items", cart.items.len());
        self.db.upsert_cart(user_id, &cart.items).await
    }

    /// The shared clamping pass: drop unknown products, clamp quantities to stock,
    /// re-snapshot name/price/image.
    async fn validate_and_clamp(&self, items: Vec<NewCartItem>) -> Result<Vec<CartItem>, CartError> {
        let mut validated = Vec::with_capacity(items.len());
        for item in items {
            let Some(product) = self
                .db
                .fetch_product(&item.product_id)
                .await
                .map_err(|e| CartError::DatabaseError(e.to_string()))?
            else {
                debug!("🛒️ Dropping unknown product {} from cart", item.product_id);
                continue;
            };
            validated.push(CartItem {
                product_id: product.id,
                quantity: item.quantity.max(0).min(product.stock),
                name: product.name,
                price: product.price,
                image: product.image,
            });
        }
        Ok(validated)
    }
}
