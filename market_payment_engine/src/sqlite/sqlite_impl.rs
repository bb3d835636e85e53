//! `SqliteDatabase` is a concrete implementation of a marketplace payment engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`](crate::traits)
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{carts, clients, db_url, new_pool, orders, products};
use crate::{
    db_types::{
        Address,
        Cart,
        CartItem,
        Client,
        NewCartItem,
        NewOrder,
        NewOrderItem,
        NewProduct,
        Order,
        OrderItem,
        OrderStatus,
        Product,
        ProductUpdate,
        Seller,
        SellerSale,
    },
    traits::{
        AccountApiError,
        AccountManagement,
        CartApiError,
        CartManagement,
        CatalogApiError,
        CatalogManagement,
        MirrorRefs,
        OrderApiError,
        OrderManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new connection pool for the database at `MPS_DATABASE_URL` and returns the database handle.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl AccountManagement for SqliteDatabase {
    async fn fetch_client_by_user_id(&self, user_id: &str) -> Result<Option<Client>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let client = clients::fetch_client_by_user_id(user_id, &mut conn).await?;
        Ok(client)
    }

    async fn fetch_client_by_id(&self, client_id: i64) -> Result<Option<Client>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let client = clients::fetch_client_by_id(client_id, &mut conn).await?;
        Ok(client)
    }

    async fn fetch_seller_by_user_id(&self, user_id: &str) -> Result<Option<Seller>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let seller = clients::fetch_seller_by_user_id(user_id, &mut conn).await?;
        Ok(seller)
    }

    async fn fetch_address_by_id(&self, address_id: i64) -> Result<Option<Address>, AccountApiError> {
        let mut conn = self.pool.acquire().await?;
        let address = clients::fetch_address_by_id(address_id, &mut conn).await?;
        Ok(address)
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart_for_client(&self, client_id: i64) -> Result<Option<(Cart, Vec<CartItem>)>, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let Some(cart) = carts::fetch_cart_for_client(client_id, &mut conn).await? else {
            return Ok(None);
        };
        let items = carts::fetch_cart_items(cart.id, &mut conn).await?;
        Ok(Some((cart, items)))
    }

    async fn fetch_cart_by_id(&self, cart_id: i64) -> Result<Option<Cart>, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let cart = carts::fetch_cart_by_id(cart_id, &mut conn).await?;
        Ok(cart)
    }

    async fn fetch_cart_item(&self, cart_item_id: i64) -> Result<Option<CartItem>, CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let item = carts::fetch_cart_item(cart_item_id, &mut conn).await?;
        Ok(item)
    }

    async fn create_cart(&self, client_id: i64, items: &[NewCartItem]) -> Result<(Cart, Vec<CartItem>), CartApiError> {
        let mut tx = self.pool.begin().await?;
        if let Some(existing) = carts::fetch_cart_for_client(client_id, &mut tx).await? {
            return Err(CartApiError::CartAlreadyExists(existing.id));
        }
        let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
        let missing = products::missing_product_ids(&product_ids, &mut tx).await?;
        if !missing.is_empty() {
            return Err(CartApiError::MissingProducts(missing));
        }
        let cart = carts::insert_cart(client_id, &mut tx).await?;
        let mut cart_items = Vec::with_capacity(items.len());
        for item in items {
            let item = carts::insert_cart_item(cart.id, item, &mut tx).await?;
            cart_items.push(item);
        }
        tx.commit().await?;
        debug!("🛒 Created cart {} for client {client_id} with {} item(s)", cart.id, cart_items.len());
        Ok((cart, cart_items))
    }

    async fn set_cart_item_quantity(&self, cart_item_id: i64, quantity: i64) -> Result<CartItem, CartApiError> {
        let mut tx = self.pool.begin().await?;
        let item = carts::update_cart_item_quantity(cart_item_id, quantity, &mut tx).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn delete_cart(&self, cart_id: i64) -> Result<(), CartApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = carts::delete_cart(cart_id, &mut conn).await?;
        if !deleted {
            return Err(CartApiError::CartNotFound(cart_id));
        }
        debug!("🛒 Deleted cart {cart_id}");
        Ok(())
    }

    async fn clear_cart(&self, cart_id: i64) -> Result<u64, CartApiError> {
        let mut tx = self.pool.begin().await?;
        if carts::fetch_cart_by_id(cart_id, &mut tx).await?.is_none() {
            return Err(CartApiError::CartNotFound(cart_id));
        }
        let n = carts::clear_cart(cart_id, &mut tx).await?;
        tx.commit().await?;
        Ok(n)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_products_by_ids(&self, product_ids: &[i64]) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products_by_ids(product_ids, &mut conn).await?;
        Ok(result)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        debug!("🗃️ Product \"{}\" saved with id {} (awaiting mirror refs)", product.name, product.id);
        Ok(product)
    }

    async fn set_mirror_refs(&self, product_id: i64, refs: &MirrorRefs) -> Result<Product, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::set_mirror_refs(product_id, refs, &mut conn).await?;
        debug!("🗃️ Product {product_id} linked to mirror {}", refs.product_ref);
        Ok(product)
    }

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let product = products::update_product(product_id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn delete_product(&self, product_id: i64) -> Result<bool, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = products::delete_product(product_id, &mut conn).await?;
        Ok(deleted)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db_err| db_err.is_unique_violation())
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder, items: &[NewOrderItem]) -> Result<(Order, bool), OrderApiError> {
        let mut tx = self.pool.begin().await?;
        // Idempotency rides on the UNIQUE(gateway_session_id) constraint. Two callers (a webhook delivery and a
        // client confirmation, say) can both reach this insert; the loser's violation is the signal that the order
        // already exists, and it returns the winner's row instead of an error.
        let new_order = match orders::insert_order(&order, &mut tx).await {
            Ok(new_order) => new_order,
            Err(e) if is_unique_violation(&e) => {
                drop(tx);
                let mut conn = self.pool.acquire().await?;
                let existing = orders::fetch_order_by_session(&order.gateway_session_id, &mut conn)
                    .await?
                    .ok_or_else(|| OrderApiError::DatabaseError(e.to_string()))?;
                debug!(
                    "🗃️ Order for session {} already exists with id {}. Nothing to do.",
                    order.gateway_session_id, existing.id
                );
                return Ok((existing, false));
            },
            Err(e) => return Err(e.into()),
        };
        for item in items {
            let decremented = products::decrement_stock(item.product_id, item.quantity, &mut tx).await?;
            if !decremented {
                // Dropping the transaction rolls everything back, including prior decrements.
                return Err(OrderApiError::InsufficientStock(item.product_id));
            }
            orders::insert_order_item(new_order.id, item, &mut tx).await?;
        }
        tx.commit().await?;
        debug!(
            "🗃️ Order {} (session {}) saved with {} line(s), total {}",
            new_order.id,
            new_order.gateway_session_id,
            items.len(),
            new_order.total
        );
        Ok((new_order, true))
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_order_by_session(&self, session_id: &str) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_session(session_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_client(&self, client_id: i64) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_client(client_id, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_sales_for_seller(&self, seller_id: i64) -> Result<Vec<SellerSale>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let sales = orders::fetch_sales_for_seller(seller_id, &mut conn).await?;
        Ok(sales)
    }

    async fn seller_has_item_in_order(&self, order_id: i64, seller_id: i64) -> Result<bool, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::seller_has_item_in_order(order_id, seller_id, &mut conn).await?;
        Ok(result)
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, OrderApiError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order_status(order_id, status, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }
}
