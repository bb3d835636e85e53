use sqlx::SqliteConnection;

use crate::db_types::{Address, Client, Seller};

pub async fn fetch_client_by_user_id(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Client>, sqlx::Error> {
    let client =
        sqlx::query_as("SELECT * FROM clients WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(client)
}

pub async fn fetch_client_by_id(client_id: i64, conn: &mut SqliteConnection) -> Result<Option<Client>, sqlx::Error> {
    let client = sqlx::query_as("SELECT * FROM clients WHERE id = $1").bind(client_id).fetch_optional(conn).await?;
    Ok(client)
}

pub async fn fetch_seller_by_user_id(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Seller>, sqlx::Error> {
    let seller =
        sqlx::query_as("SELECT * FROM sellers WHERE user_id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(seller)
}

pub async fn fetch_address_by_id(
    address_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Address>, sqlx::Error> {
    let address =
        sqlx::query_as("SELECT * FROM addresses WHERE id = $1").bind(address_id).fetch_optional(conn).await?;
    Ok(address)
}
