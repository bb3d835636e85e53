//! A thin JSON/REST client for the external payment gateway.
//!
//! The gateway hosts two things on our behalf:
//! * a mirrored catalog (a "mirror product" and "mirror price" per local product), and
//! * checkout sessions, which collect payment out-of-band and call back into the server via webhooks.
//!
//! This crate only speaks the gateway's wire format. All of the business rules around mirroring and checkout live in
//! `market_payment_engine`.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::GatewayApi;
pub use config::GatewayConfig;
pub use data_objects::{
    CheckoutSession,
    GatewayEvent,
    MirrorPrice,
    MirrorProduct,
    MirrorProductUpdate,
    PaymentStatus,
    SessionLineItem,
};
pub use error::GatewayApiError;
