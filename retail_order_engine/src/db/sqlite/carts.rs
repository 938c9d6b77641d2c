use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::traits::CartError,
    db_types::{Cart, CartItem},
};

pub async fn fetch_cart(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Cart>, CartError> {
    let cart = sqlx::query_as::<_, Cart>("SELECT user_id, updated_at FROM carts WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;
    match cart {
        None => Ok(None),
        Some(mut cart) => {
            cart.items = fetch_cart_items(user_id, conn).await?;
            Ok(Some(cart))
        },
    }
}

async fn fetch_cart_items(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<CartItem>, CartError> {
    let items = sqlx::query_as::<_, CartItem>(
        r#"
            SELECT product_id, quantity, name, price, image
            FROM cart_items
            WHERE user_id = ?
            ORDER BY rowid ASC;
        "#,
    )
    .bind(user_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(items)
}

/// Creates the cart row if needed and replaces the full item set. The last-updated
/// timestamp is touched here, at the write site, as part of the same statement batch.
/// Callers wrap this in a transaction and pass `&mut *tx`.
pub async fn upsert_cart(
    user_id: &str,
    items: &[CartItem],
    conn: &mut SqliteConnection,
) -> Result<(), CartError> {
    sqlx::query(
        r#"
            INSERT INTO carts (user_id)
            VALUES (?1)
            ON CONFLICT (user_id) DO UPDATE SET updated_at = CURRENT_TIMESTAMP;
        "#,
    )
    .bind(user_id)
    .execute(&mut *conn)
    .await?;
    sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    for item in items {
        sqlx::query(
            r#"
                INSERT INTO cart_items (user_id, product_id, quantity, name, price, image)
                VALUES (?, ?, ?, ?, ?, ?);
            "#,
        )
        .bind(user_id)
        .bind(item.product_id.as_str())
        .bind(item.quantity)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .execute(&mut *conn)
        .await?;
    }
    trace!("🗃️ Cart for user {user_id} now holds {} items", items.len());
    Ok(())
}
