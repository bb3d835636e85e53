use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::{CatalogApiError, MirrorRefs},
};

/// Fetches a sellable product. Rows that have not completed mirror creation are never returned.
pub async fn fetch_product(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as("SELECT * FROM products WHERE id = $1 AND mirror_product_ref IS NOT NULL")
        .bind(product_id)
        .fetch_optional(conn)
        .await?;
    Ok(product)
}

/// Batch lookup of sellable products by id. Missing ids are silently omitted; callers diff against their input.
pub async fn fetch_products_by_ids(
    product_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    if product_ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new("SELECT * FROM products WHERE mirror_product_ref IS NOT NULL AND id IN (");
    let mut ids = builder.separated(", ");
    for id in product_ids {
        ids.push_bind(id);
    }
    builder.push(")");
    trace!("🗃️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    Ok(products)
}

/// Returns the subset of `product_ids` that does not resolve to a sellable product.
pub async fn missing_product_ids(
    product_ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Vec<i64>, sqlx::Error> {
    let found = fetch_products_by_ids(product_ids, conn).await?;
    let mut missing: Vec<i64> =
        product_ids.iter().copied().filter(|id| !found.iter().any(|p| p.id == *id)).collect();
    missing.sort_unstable();
    missing.dedup();
    Ok(missing)
}

/// Inserts a product row without mirror refs. The row stays invisible to all read paths until
/// [`set_mirror_refs`] lands, so a failed mirror creation can be compensated without ever exposing the row.
pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (seller_id, category_id, name, description, image_url, price, stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(product.seller_id)
    .bind(product.category_id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.image_url)
    .bind(product.price)
    .bind(product.stock)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn set_mirror_refs(
    product_id: i64,
    refs: &MirrorRefs,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogApiError> {
    let product: Option<Product> = sqlx::query_as(
        "UPDATE products SET mirror_product_ref = $1, mirror_price_ref = $2, updated_at = CURRENT_TIMESTAMP WHERE id \
         = $3 RETURNING *",
    )
    .bind(&refs.product_ref)
    .bind(&refs.price_ref)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    product.ok_or(CatalogApiError::ProductNotFound(product_id))
}

pub async fn update_product(
    product_id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogApiError> {
    if update.is_empty() {
        return Err(CatalogApiError::EmptyUpdate);
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(image_url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(image_url);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    product.ok_or(CatalogApiError::ProductNotFound(product_id))
}

pub async fn delete_product(product_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(product_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

/// Optimistic stock decrement. Returns `false` (and changes nothing) when fewer than `quantity` units remain.
pub async fn decrement_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND stock >= $1",
    )
    .bind(quantity)
    .bind(product_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}
