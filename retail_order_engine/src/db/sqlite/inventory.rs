use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::traits::{InventoryError, StockDecrement},
    db_types::{Money, Product, ProductId},
};

/// Decrements the product's stock by `quantity`, but only if at least `quantity` units
/// are available. The check and the write are one statement; under concurrent load the
/// storage engine serializes them, which is what keeps stock from ever going negative.
pub async fn decrement_stock(
    product_id: &ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<StockDecrement, InventoryError> {
    let result = sqlx::query(
        r#"
            UPDATE products
            SET stock = stock - ?1, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?2 AND stock >= ?1;
        "#,
    )
    .bind(quantity)
    .bind(product_id.as_str())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 1 {
        trace!("🗃️ Reserved {quantity} units of product {product_id}");
        return Ok(StockDecrement::Applied);
    }
    // The conditional update matched nothing. Work out which of the two reasons applies;
    // this read is diagnostic only and plays no part in the decrement itself.
    match fetch_stock(product_id, conn).await? {
        None => Ok(StockDecrement::NotFound),
        Some(available) => Ok(StockDecrement::Insufficient { available }),
    }
}

/// Puts `quantity` units back. Compensation path for failed reservations and releases.
pub async fn restore_stock(
    product_id: &ProductId,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), InventoryError> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock + ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
    )
    .bind(quantity)
    .bind(product_id.as_str())
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(InventoryError::ProductNotFound(product_id.clone()));
    }
    trace!("🗃️ Restored {quantity} units of product {product_id}");
    Ok(())
}

pub async fn fetch_product(
    product_id: &ProductId,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, InventoryError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
            SELECT id, name, description, price, stock, image, created_at, updated_at
            FROM products
            WHERE id = ?;
        "#,
    )
    .bind(product_id.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(product)
}

async fn fetch_stock(
    product_id: &ProductId,
    conn: &mut SqliteConnection,
) -> Result<Option<i64>, InventoryError> {
    let stock = sqlx::query_scalar::<_, i64>("SELECT stock FROM products WHERE id = ?")
        .bind(product_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(stock)
}

/// Inserts or replaces a product record. The catalog collaborator owns product CRUD in
/// production; this exists for seeding and tests.
pub async fn upsert_product(
    product_id: &ProductId,
    name: &str,
    price: Money,
    stock: i64,
    conn: &mut SqliteConnection,
) -> Result<(), InventoryError> {
    sqlx::query(
        r#"
            INSERT INTO products (id, name, price, stock)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (id) DO UPDATE
            SET name = ?2, price = ?3, stock = ?4, updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(product_id.as_str())
    .bind(name)
    .bind(price)
    .bind(stock)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
