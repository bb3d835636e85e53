use thiserror::Error;

use crate::db_types::{Cart, CartItem, NewCartItem};

/// Storage behaviour for a client's pending selection. All mutating operations on one cart run inside a single
/// transaction in the backend, so concurrent quantity changes on the same cart serialize instead of losing updates.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    async fn fetch_cart_for_client(&self, client_id: i64) -> Result<Option<(Cart, Vec<CartItem>)>, CartApiError>;

    async fn fetch_cart_by_id(&self, cart_id: i64) -> Result<Option<Cart>, CartApiError>;

    async fn fetch_cart_item(&self, cart_item_id: i64) -> Result<Option<CartItem>, CartApiError>;

    /// Creates a cart with its initial items as one atomic insert. Every referenced product must exist; the check is
    /// over the *whole* item list and fails with [`CartApiError::MissingProducts`] naming every absent id.
    async fn create_cart(&self, client_id: i64, items: &[NewCartItem]) -> Result<(Cart, Vec<CartItem>), CartApiError>;

    async fn set_cart_item_quantity(&self, cart_item_id: i64, quantity: i64) -> Result<CartItem, CartApiError>;

    async fn delete_cart(&self, cart_id: i64) -> Result<(), CartApiError>;

    /// Removes all items, keeping the cart row. Returns the number of items removed.
    async fn clear_cart(&self, cart_id: i64) -> Result<u64, CartApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum CartApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("No client profile exists for user {0}")]
    ClientNotFound(String),
    #[error("Cart {0} does not exist")]
    CartNotFound(i64),
    #[error("Cart item {0} does not exist")]
    CartItemNotFound(i64),
    #[error("The client already has an active cart (id {0})")]
    CartAlreadyExists(i64),
    #[error("These products do not exist: {}", .0.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", "))]
    MissingProducts(Vec<i64>),
    #[error("Invalid quantity: {0}. Quantities must be at least 1")]
    InvalidQuantity(i64),
    #[error("A cart needs at least one item")]
    EmptyCart,
    #[error("Access denied. {0}")]
    Forbidden(String),
}

impl From<sqlx::Error> for CartApiError {
    fn from(e: sqlx::Error) -> Self {
        CartApiError::DatabaseError(e.to_string())
    }
}

impl From<super::AccountApiError> for CartApiError {
    fn from(e: super::AccountApiError) -> Self {
        match e {
            super::AccountApiError::DatabaseError(e) => CartApiError::DatabaseError(e),
        }
    }
}
