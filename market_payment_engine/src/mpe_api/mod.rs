//! The high-level behaviour of the payment engine is implemented here. Each API wraps a storage backend (and, where
//! the gateway mirror is involved, a [`PaymentGatewayClient`](crate::traits::PaymentGatewayClient)) and owns the
//! business rules; route handlers stay thin.
pub mod cart_api;
pub mod catalog_api;
pub mod order_flow_api;

pub use cart_api::CartApi;
pub use catalog_api::CatalogApi;
pub use order_flow_api::OrderFlowApi;
