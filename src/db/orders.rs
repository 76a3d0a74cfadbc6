use crate::db::{models::*, DbPool};
use crate::error::{Error, Result};
use chrono::Utc;

/// Create a new order against an active listing.
///
/// The total is computed server-side from the listing price. The whole
/// sequence runs in one transaction: the availability check, the order row,
/// and the stock decrement either all land or none do. The decrement
/// re-checks the quantity, so two in-flight orders cannot both drain the
/// same stock.
pub async fn create_order(pool: &DbPool, new_order: &NewOrder) -> Result<Order> {
    let mut tx = pool.begin().await?;

    let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE id = ?")
        .bind(new_order.listing_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Listing {} not found", new_order.listing_id)))?;

    if listing.status != "active" {
        return Err(Error::Conflict(format!(
            "Listing {} is not available for ordering",
            listing.id
        )));
    }

    if new_order.quantity > listing.quantity {
        return Err(Error::Conflict(format!(
            "Requested quantity {} exceeds available {}",
            new_order.quantity, listing.quantity
        )));
    }

    let total_cents = listing.price_cents * new_order.quantity;
    let now = Utc::now();

    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (listing_id, buyer_id, quantity, total_cents, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, 'pending', ?, ?)
        RETURNING *
        "#,
    )
    .bind(new_order.listing_id)
    .bind(new_order.buyer_id)
    .bind(new_order.quantity)
    .bind(total_cents)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    // Guarded decrement: rejects the order if a concurrent order drained the
    // stock after the check above. Returning early drops the transaction and
    // rolls the inserted order row back with it.
    let updated = sqlx::query(
        r#"
        UPDATE listings
        SET quantity = quantity - ?,
            status = CASE WHEN quantity - ? <= 0 THEN 'sold_out' ELSE status END,
            updated_at = ?
        WHERE id = ? AND quantity >= ?
        "#,
    )
    .bind(new_order.quantity)
    .bind(new_order.quantity)
    .bind(now)
    .bind(new_order.listing_id)
    .bind(new_order.quantity)
    .execute(&mut *tx)
    .await?;

    if updated.rows_affected() == 0 {
        return Err(Error::Conflict(format!(
            "Listing {} no longer has {} available",
            new_order.listing_id, new_order.quantity
        )));
    }

    tx.commit().await?;

    Ok(order)
}

/// Get order by ID
pub async fn get_order(pool: &DbPool, order_id: i64) -> Result<Order> {
    let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Order {order_id} not found")))?;

    Ok(order)
}

/// List orders placed by a buyer, newest first
pub async fn list_orders_by_buyer(
    pool: &DbPool,
    buyer_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(
        "SELECT * FROM orders WHERE buyer_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
    )
    .bind(buyer_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(orders)
}

/// Count orders placed by a buyer
pub async fn count_orders_by_buyer(pool: &DbPool, buyer_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE buyer_id = ?")
        .bind(buyer_id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Update order status
pub async fn update_order_status(pool: &DbPool, order_id: i64, status: &str) -> Result<()> {
    let now = Utc::now();

    let result = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(order_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Order {order_id} not found")));
    }

    Ok(())
}

/// Count all orders
pub async fn count_orders(pool: &DbPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await?;

    Ok(count)
}
