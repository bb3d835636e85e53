//! Adapter between the engine's [`PaymentGatewayClient`] trait and the gateway REST client in `gateway_tools`.
//!
//! The engine works with manifests and mirror refs; the gateway speaks products, prices, sessions and metadata. This
//! module owns that translation, including carrying the checkout manifest as a JSON string under the `manifest`
//! metadata key so it comes back verbatim with the session.
use std::collections::HashMap;

use gateway_tools::{CheckoutSession, GatewayApi, GatewayApiError, GatewayConfig, PaymentStatus, SessionLineItem};
use log::*;
use market_payment_engine::{
    db_types::{CheckoutManifest, Product},
    traits::{
        CheckoutLineItem,
        GatewayClientError,
        GatewaySession,
        MirrorRefs,
        MirrorUpdate,
        NewGatewaySession,
        PaymentGatewayClient,
    },
};
use mps_common::{Money, DEFAULT_CURRENCY_CODE};

use crate::errors::ServerError;

pub const MANIFEST_METADATA_KEY: &str = "manifest";
pub const PRODUCT_ID_METADATA_KEY: &str = "local_product_id";

#[derive(Clone)]
pub struct GatewayClient {
    api: GatewayApi,
}

impl GatewayClient {
    pub fn try_new(config: GatewayConfig) -> Result<Self, ServerError> {
        let api = GatewayApi::new(config).map_err(|e| ServerError::InitializeError(e.to_string()))?;
        Ok(Self { api })
    }
}

impl PaymentGatewayClient for GatewayClient {
    async fn create_mirror(&self, product: &Product) -> Result<MirrorRefs, GatewayClientError> {
        let metadata = HashMap::from([(PRODUCT_ID_METADATA_KEY.to_string(), product.id.to_string())]);
        let mirror = self
            .api
            .create_product(&product.name, product.description.as_deref(), product.image_url.as_deref(), metadata)
            .await
            .map_err(into_client_error)?;
        let price = match self.api.create_price(&mirror.id, product.price, DEFAULT_CURRENCY_CODE).await {
            Ok(price) => price,
            Err(e) => {
                // The caller rolls the local row back; the refless mirror product stays behind on the gateway.
                warn!("🪞 Mirror {} was created but its price was not. Deactivating the orphan. {e}", mirror.id);
                if let Err(e) = self.api.deactivate_product(&mirror.id).await {
                    warn!("🪞 Could not deactivate orphaned mirror {}. {e}", mirror.id);
                }
                return Err(into_client_error(e));
            },
        };
        Ok(MirrorRefs { product_ref: mirror.id, price_ref: price.id })
    }

    async fn update_mirror(&self, mirror_product_ref: &str, update: &MirrorUpdate) -> Result<(), GatewayClientError> {
        let update = gateway_tools::MirrorProductUpdate {
            name: update.name.clone(),
            description: update.description.clone(),
            images: update.image_url.clone().map(|url| vec![url]),
            active: None,
        };
        self.api.update_product(mirror_product_ref, update).await.map_err(into_client_error)?;
        Ok(())
    }

    async fn create_mirror_price(
        &self,
        mirror_product_ref: &str,
        price: Money,
    ) -> Result<String, GatewayClientError> {
        let price =
            self.api.create_price(mirror_product_ref, price, DEFAULT_CURRENCY_CODE).await.map_err(into_client_error)?;
        Ok(price.id)
    }

    async fn deactivate_mirror(&self, mirror_product_ref: &str) -> Result<(), GatewayClientError> {
        self.api.deactivate_product(mirror_product_ref).await.map_err(into_client_error)?;
        Ok(())
    }

    async fn create_checkout_session(
        &self,
        line_items: &[CheckoutLineItem],
        manifest: &CheckoutManifest,
    ) -> Result<NewGatewaySession, GatewayClientError> {
        let items: Vec<SessionLineItem> = line_items
            .iter()
            .map(|item| SessionLineItem {
                name: item.name.clone(),
                unit_amount: item.unit_price,
                currency: DEFAULT_CURRENCY_CODE.to_string(),
                quantity: item.quantity,
            })
            .collect();
        let manifest_json = serde_json::to_string(manifest)
            .map_err(|e| GatewayClientError::InvalidResponse(format!("Could not serialize the manifest. {e}")))?;
        let metadata = HashMap::from([(MANIFEST_METADATA_KEY.to_string(), manifest_json)]);
        let session = self.api.create_checkout_session(&items, metadata).await.map_err(into_client_error)?;
        let redirect_url = session.url.clone().ok_or_else(|| {
            GatewayClientError::InvalidResponse(format!("Session {} came back without a payment URL", session.id))
        })?;
        Ok(NewGatewaySession { session_id: session.id, redirect_url })
    }

    async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<GatewaySession>, GatewayClientError> {
        let session = self.api.fetch_checkout_session(session_id).await.map_err(into_client_error)?;
        Ok(session.map(into_engine_session))
    }
}

fn into_engine_session(session: CheckoutSession) -> GatewaySession {
    let manifest = session.metadata.get(MANIFEST_METADATA_KEY).and_then(|raw| {
        serde_json::from_str::<CheckoutManifest>(raw)
            .map_err(|e| warn!("🪞 Session {} carries an unreadable manifest. {e}", session.id))
            .ok()
    });
    let paid = matches!(session.payment_status, PaymentStatus::Paid | PaymentStatus::NoPaymentRequired);
    GatewaySession { session_id: session.id, paid, manifest }
}

fn into_client_error(e: GatewayApiError) -> GatewayClientError {
    match e {
        GatewayApiError::Timeout => GatewayClientError::Timeout,
        GatewayApiError::QueryError { status, message } => {
            GatewayClientError::Rejected(format!("HTTP {status}: {message}"))
        },
        GatewayApiError::JsonError(e) => GatewayClientError::InvalidResponse(e),
        GatewayApiError::Initialization(e) |
        GatewayApiError::RestRequestError(e) |
        GatewayApiError::RestResponseError(e) => GatewayClientError::Network(e),
    }
}
