use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Cart, CartItem, NewCartItem},
    traits::CartApiError,
};

pub async fn fetch_cart_for_client(
    client_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Cart>, sqlx::Error> {
    let cart =
        sqlx::query_as("SELECT * FROM carts WHERE client_id = $1").bind(client_id).fetch_optional(conn).await?;
    Ok(cart)
}

pub async fn fetch_cart_by_id(cart_id: i64, conn: &mut SqliteConnection) -> Result<Option<Cart>, sqlx::Error> {
    let cart = sqlx::query_as("SELECT * FROM carts WHERE id = $1").bind(cart_id).fetch_optional(conn).await?;
    Ok(cart)
}

pub async fn fetch_cart_items(cart_id: i64, conn: &mut SqliteConnection) -> Result<Vec<CartItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY id")
        .bind(cart_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

pub async fn fetch_cart_item(
    cart_item_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<CartItem>, sqlx::Error> {
    let item =
        sqlx::query_as("SELECT * FROM cart_items WHERE id = $1").bind(cart_item_id).fetch_optional(conn).await?;
    Ok(item)
}

/// Inserts a fresh cart row for the client. The UNIQUE constraint on `client_id` is what enforces the one-active-cart
/// rule; a violation maps to [`CartApiError::CartAlreadyExists`] in the caller.
pub async fn insert_cart(client_id: i64, conn: &mut SqliteConnection) -> Result<Cart, sqlx::Error> {
    let cart = sqlx::query_as("INSERT INTO carts (client_id) VALUES ($1) RETURNING *")
        .bind(client_id)
        .fetch_one(conn)
        .await?;
    Ok(cart)
}

pub async fn insert_cart_item(
    cart_id: i64,
    item: &NewCartItem,
    conn: &mut SqliteConnection,
) -> Result<CartItem, sqlx::Error> {
    let item = sqlx::query_as("INSERT INTO cart_items (cart_id, product_id, quantity) VALUES ($1, $2, $3) RETURNING *")
        .bind(cart_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .fetch_one(conn)
        .await?;
    Ok(item)
}

pub async fn update_cart_item_quantity(
    cart_item_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<CartItem, CartApiError> {
    let item: Option<CartItem> = sqlx::query_as(
        "UPDATE cart_items SET quantity = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *",
    )
    .bind(quantity)
    .bind(cart_item_id)
    .fetch_optional(conn)
    .await?;
    item.ok_or(CartApiError::CartItemNotFound(cart_item_id))
}

/// Deletes the cart row. Items go with it via the cascade.
pub async fn delete_cart(cart_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM carts WHERE id = $1").bind(cart_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn clear_cart(cart_id: i64, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1").bind(cart_id).execute(conn).await?;
    let n = result.rows_affected();
    debug!("🛒 Removed {n} item(s) from cart {cart_id}");
    Ok(n)
}
