//! Storage and gateway behaviour required by the engine APIs.
//!
//! Backends implement the storage traits; [`SqliteDatabase`](crate::SqliteDatabase) is the concrete implementation.
//! [`PaymentGatewayClient`] is implemented by an adapter over the gateway REST client (and by mocks in tests), so the
//! engine never depends on a particular wire format.

mod accounts;
mod carts;
mod catalog;
mod data_objects;
mod orders;
mod payment_gateway;

pub use accounts::{AccountApiError, AccountManagement};
pub use carts::{CartApiError, CartManagement};
pub use catalog::{CatalogApiError, CatalogManagement};
pub use data_objects::{CheckoutLineItem, GatewaySession, MirrorRefs, MirrorUpdate, NewGatewaySession};
pub use orders::{OrderApiError, OrderManagement};
pub use payment_gateway::{GatewayClientError, PaymentGatewayClient};

/// Convenience bound for backends that support the full marketplace surface.
pub trait MarketplaceDatabase: AccountManagement + CartManagement + CatalogManagement + OrderManagement {}

impl<T> MarketplaceDatabase for T where T: AccountManagement + CartManagement + CatalogManagement + OrderManagement {}
