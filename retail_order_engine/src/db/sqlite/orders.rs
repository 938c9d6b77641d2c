use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db::traits::{MarkPaidOutcome, OrderApiError},
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderStatusType, OrderUpdate},
};

const ORDER_COLUMNS: &str = "id, order_id, user_id, address, city, postal_code, country, total_price, \
                             payment_method, is_paid, paid_at, status, created_at, updated_at";

/// Inserts a new order and its snapshotted line items using the given connection. This is
/// not atomic on its own; callers wrap it in a transaction and pass `&mut *tx`.
pub async fn insert_order(
    order: &NewOrder,
    items: &[OrderItem],
    conn: &mut SqliteConnection,
) -> Result<(), OrderApiError> {
    let result = sqlx::query(
        r#"
            INSERT INTO orders (
                order_id,
                user_id,
                address,
                city,
                postal_code,
                country,
                total_price,
                payment_method
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?);
        "#,
    )
    .bind(order.order_id.as_str())
    .bind(&order.user_id)
    .bind(&order.shipping.address)
    .bind(&order.shipping.city)
    .bind(&order.shipping.postal_code)
    .bind(&order.shipping.country)
    .bind(order.total_price)
    .bind(&order.payment_method)
    .execute(&mut *conn)
    .await;
    match result {
        Err(e) if e.as_database_error().map(|db| db.is_unique_violation()).unwrap_or(false) => {
            return Err(OrderApiError::OrderAlreadyExists(order.order_id.clone()));
        },
        Err(e) => return Err(e.into()),
        Ok(_) => {},
    }
    for item in items {
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, product_id, quantity, name, price, image)
                VALUES (?, ?, ?, ?, ?, ?);
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(item.product_id.as_str())
        .bind(item.quantity)
        .bind(&item.name)
        .bind(item.price)
        .bind(&item.image)
        .execute(&mut *conn)
        .await?;
    }
    debug!("🗃️ Order {} has been saved in the DB with {} line items", order.order_id, items.len());
    Ok(())
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderApiError> {
    let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = ?");
    let order = sqlx::query_as::<_, Order>(&query)
        .bind(order_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        None => Ok(None),
        Some(mut order) => {
            order.items = fetch_order_items(order_id, conn).await?;
            Ok(Some(order))
        },
    }
}

/// Fetches the orders for one user, or every order when `user_id` is `None`.
/// Most recent first.
pub async fn fetch_orders(
    user_id: Option<&str>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, OrderApiError> {
    let mut builder = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders "));
    if let Some(user_id) = user_id {
        builder.push("WHERE user_id = ");
        builder.push_bind(user_id);
    }
    builder.push(" ORDER BY created_at DESC, id DESC");
    trace!("🗃️ Executing query: {}", builder.sql());
    let mut orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    for order in &mut orders {
        order.items = fetch_order_items(&order.order_id, conn).await?;
    }
    trace!("🗃️ fetch_orders returned {} orders", orders.len());
    Ok(orders)
}

async fn fetch_order_items(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, OrderApiError> {
    let items = sqlx::query_as::<_, OrderItem>(
        r#"
            SELECT product_id, quantity, name, price, image
            FROM order_items
            WHERE order_id = ?
            ORDER BY id ASC;
        "#,
    )
    .bind(order_id.as_str())
    .fetch_all(&mut *conn)
    .await?;
    Ok(items)
}

pub async fn update_order(
    order_id: &OrderId,
    update: &OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<(), OrderApiError> {
    if update.is_empty() {
        debug!("🗃️ No fields to update for order {order_id}. Update request skipped.");
        return Ok(());
    }
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP,");
    let mut set_clause = builder.separated(", ");
    if let Some(status) = update.status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.to_string());
    }
    if let Some(is_paid) = update.is_paid {
        set_clause.push("is_paid = ");
        set_clause.push_bind_unseparated(is_paid);
    }
    if let Some(paid_at) = update.paid_at {
        set_clause.push("paid_at = ");
        set_clause.push_bind_unseparated(paid_at);
    }
    builder.push(" WHERE order_id = ");
    builder.push_bind(order_id.as_str());
    trace!("🗃️ Executing query: {}", builder.sql());
    builder.build().execute(&mut *conn).await?;
    Ok(())
}

/// The conditional paid-transition. The `is_paid = 0` guard lives in the same statement
/// as the write, so a duplicate delivery of the same success event matches zero rows and
/// changes nothing. A `Pending` status advances to `Processing`; a status that has
/// already moved on is left where it is, since the lifecycle never regresses.
pub async fn mark_order_paid(
    order_id: &OrderId,
    paid_at: DateTime<Utc>,
    conn: &mut SqliteConnection,
) -> Result<MarkPaidOutcome, OrderApiError> {
    let result = sqlx::query(
        r#"
            UPDATE orders
            SET is_paid = 1,
                paid_at = ?1,
                status = CASE WHEN status = ?2 THEN ?3 ELSE status END,
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = ?4 AND is_paid = 0;
        "#,
    )
    .bind(paid_at)
    .bind(OrderStatusType::Pending.to_string())
    .bind(OrderStatusType::Processing.to_string())
    .bind(order_id.as_str())
    .execute(&mut *conn)
    .await?;
    let order = fetch_order_by_order_id(order_id, conn).await?;
    match (order, result.rows_affected()) {
        (None, _) => Ok(MarkPaidOutcome::NotFound),
        (Some(order), n) if n > 0 => Ok(MarkPaidOutcome::Paid(order)),
        (Some(order), _) => Ok(MarkPaidOutcome::AlreadyPaid(order)),
    }
}
