//! # Market Payment Engine
//!
//! The engine owns everything between "a shopper has a cart" and "a durable order exists": cart storage, checkout
//! session creation with price capture, order finalization from a completed payment session, order authorization, and
//! keeping the local catalog mirrored into the external payment gateway.
//!
//! The design bridges two independently-failing systems. The local store is always authoritative once a record
//! exists; the gateway mirror may lag behind on updates, but creation is all-or-nothing: a product either exists
//! locally *with* usable mirror references, or not at all.
//!
//! Storage backends implement the traits in [`traits`]; [`SqliteDatabase`] is the concrete backend. The high-level
//! APIs in [`mpe_api`] wrap a backend (and, where needed, a gateway client) and own the business rules.

pub mod db_types;
pub mod mpe_api;
pub mod sqlite;
pub mod traits;

pub use mpe_api::{CartApi, CatalogApi, OrderFlowApi};
pub use sqlite::SqliteDatabase;
