use thiserror::Error;

use crate::{
    db_types::{CheckoutManifest, Product},
    traits::{CheckoutLineItem, GatewaySession, MirrorRefs, MirrorUpdate, NewGatewaySession},
};

/// Everything the engine needs from the external payment gateway. Implemented by an adapter over the REST client in
/// `gateway_tools`, and by mocks in tests.
#[allow(async_fn_in_trait)]
pub trait PaymentGatewayClient {
    /// Creates the mirror product and its price for a local product, returning both refs.
    async fn create_mirror(&self, product: &Product) -> Result<MirrorRefs, GatewayClientError>;

    /// Pushes non-price field changes to an existing mirror product.
    async fn update_mirror(&self, mirror_product_ref: &str, update: &MirrorUpdate) -> Result<(), GatewayClientError>;

    /// Registers a new mirror price (mirror prices are immutable; a price change is a new price object). Returns the
    /// new price ref.
    async fn create_mirror_price(
        &self,
        mirror_product_ref: &str,
        price: mps_common::Money,
    ) -> Result<String, GatewayClientError>;

    /// Marks the mirror product inactive. Gateways archive rather than hard-delete referenced catalog entries.
    async fn deactivate_mirror(&self, mirror_product_ref: &str) -> Result<(), GatewayClientError>;

    /// Creates a hosted checkout session carrying the manifest as opaque metadata.
    async fn create_checkout_session(
        &self,
        line_items: &[CheckoutLineItem],
        manifest: &CheckoutManifest,
    ) -> Result<NewGatewaySession, GatewayClientError>;

    /// Retrieves a session and its manifest. `None` if the gateway has no such session.
    async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<GatewaySession>, GatewayClientError>;
}

#[derive(Debug, Clone, Error)]
pub enum GatewayClientError {
    #[error("Could not reach the payment gateway. {0}")]
    Network(String),
    #[error("The payment gateway rejected the call. {0}")]
    Rejected(String),
    #[error("The payment gateway did not respond in time")]
    Timeout,
    #[error("Unusable response from the payment gateway. {0}")]
    InvalidResponse(String),
}
