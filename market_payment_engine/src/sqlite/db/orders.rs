use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, SellerSale},
    traits::OrderApiError,
};

pub async fn fetch_order(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_session(
    session_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE gateway_session_id = $1")
        .bind(session_id)
        .fetch_optional(conn)
        .await?;
    Ok(order)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_orders_for_client(
    client_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE client_id = $1 ORDER BY created_at DESC, id DESC")
        .bind(client_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

pub async fn fetch_sales_for_seller(
    seller_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<SellerSale>, sqlx::Error> {
    let sales = sqlx::query_as(
        r#"
            SELECT
                orders.id          AS order_id,
                orders.status      AS order_status,
                orders.created_at  AS order_created_at,
                orders.client_id   AS client_id,
                order_items.product_id,
                order_items.product_name,
                order_items.quantity,
                order_items.unit_price
            FROM order_items
            JOIN orders ON orders.id = order_items.order_id
            JOIN products ON products.id = order_items.product_id
            WHERE products.seller_id = $1
            ORDER BY orders.created_at DESC, order_items.id
        "#,
    )
    .bind(seller_id)
    .fetch_all(conn)
    .await?;
    Ok(sales)
}

pub async fn seller_has_item_in_order(
    order_id: i64,
    seller_id: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let found: Option<(i64,)> = sqlx::query_as(
        r#"
            SELECT 1
            FROM order_items
            JOIN products ON products.id = order_items.product_id
            WHERE order_items.order_id = $1 AND products.seller_id = $2
            LIMIT 1
        "#,
    )
    .bind(order_id)
    .bind(seller_id)
    .fetch_optional(conn)
    .await?;
    Ok(found.is_some())
}

/// Inserts the order row for a completed payment session. A duplicate session surfaces as a unique violation on
/// `gateway_session_id`; the caller turns that into a no-op.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order = sqlx::query_as(
        r#"
            INSERT INTO orders (gateway_session_id, client_id, address_id, total, status, is_guest, email, phone)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(&order.gateway_session_id)
    .bind(order.client_id)
    .bind(order.address_id)
    .bind(order.total)
    .bind(OrderStatus::Paid)
    .bind(order.is_guest)
    .bind(&order.email)
    .bind(&order.phone)
    .fetch_one(conn)
    .await?;
    Ok(order)
}

pub async fn insert_order_item(
    order_id: i64,
    item: &NewOrderItem,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, product_id, product_name, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price)
    .fetch_one(conn)
    .await?;
    Ok(item)
}

pub async fn update_order_status(
    order_id: i64,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderApiError> {
    let order: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(order_id)
            .fetch_optional(conn)
            .await?;
    debug!("📦 Order {order_id} moved to {status}");
    order.ok_or(OrderApiError::OrderNotFound(order_id))
}
