//! # Market payment server
//!
//! This crate hosts the HTTP surface of the marketplace checkout pipeline. It is responsible for:
//! * The cart, catalog, checkout and order endpoints under `/api`.
//! * Receiving signed webhook events from the payment gateway under `/webhook` and turning completed checkout
//!   sessions into durable orders.
//!
//! All business rules live in `market_payment_engine`; handlers here stay thin and translate between HTTP and the
//! engine APIs.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config] for more information.

pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod webhook_routes;
