use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, SellerSale},
    traits::{AccountApiError, CatalogApiError, GatewayClientError},
};

/// Storage behaviour for durable orders.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Materializes an order and its line-item snapshots in a single atomic transaction, decrementing stock for each
    /// line with an optimistic guard. Idempotent on the gateway session id: if an order for the session already
    /// exists, it is returned unchanged with `false` in the second position and nothing is written.
    async fn insert_order(&self, order: NewOrder, items: &[NewOrderItem]) -> Result<(Order, bool), OrderApiError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, OrderApiError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderApiError>;

    async fn fetch_order_by_session(&self, session_id: &str) -> Result<Option<Order>, OrderApiError>;

    /// A client's orders, newest first.
    async fn fetch_orders_for_client(&self, client_id: i64) -> Result<Vec<Order>, OrderApiError>;

    /// Every sold line item referencing one of the seller's products, joined with the owning order.
    async fn fetch_sales_for_seller(&self, seller_id: i64) -> Result<Vec<SellerSale>, OrderApiError>;

    /// True if at least one of the order's items references a product owned by the seller.
    async fn seller_has_item_in_order(&self, order_id: i64, seller_id: i64) -> Result<bool, OrderApiError>;

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, OrderApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Checkout session {0} does not exist")]
    SessionNotFound(String),
    #[error("Checkout session {0} has not been completed")]
    SessionNotCompleted(String),
    #[error("Checkout session {0} carries no usable manifest")]
    ManifestMissing(String),
    #[error("A checkout needs at least one item")]
    EmptyCheckout,
    #[error("Invalid quantity: {0}. Quantities must be at least 1")]
    InvalidQuantity(i64),
    #[error("These products do not exist: {}", .0.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", "))]
    MissingProducts(Vec<i64>),
    #[error("Client {0} does not exist")]
    ClientNotFound(String),
    #[error("Address {0} does not exist")]
    AddressNotFound(i64),
    #[error("Address {address_id} does not belong to client {client_id}")]
    AddressNotOwned { address_id: i64, client_id: i64 },
    #[error("Not enough stock for product {0}")]
    InsufficientStock(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("Access denied. {0}")]
    Forbidden(String),
    #[error("Order status cannot change from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
    #[error("Payment gateway error. {0}")]
    GatewayError(#[from] GatewayClientError),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

impl From<AccountApiError> for OrderApiError {
    fn from(e: AccountApiError) -> Self {
        match e {
            AccountApiError::DatabaseError(e) => OrderApiError::DatabaseError(e),
        }
    }
}

impl From<CatalogApiError> for OrderApiError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::DatabaseError(e) => OrderApiError::DatabaseError(e),
            CatalogApiError::GatewayError(e) => OrderApiError::GatewayError(e),
            other => OrderApiError::DatabaseError(other.to_string()),
        }
    }
}
