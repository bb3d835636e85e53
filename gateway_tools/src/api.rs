use std::{collections::HashMap, sync::Arc, time::Duration};

use log::*;
use mps_common::Money;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::{
    config::GatewayConfig,
    data_objects::{CheckoutSession, MirrorPrice, MirrorProduct, MirrorProductUpdate, SessionLineItem},
    GatewayApiError,
};

#[derive(Clone)]
pub struct GatewayApi {
    config: GatewayConfig,
    client: Arc<Client>,
}

impl GatewayApi {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let val = HeaderValue::from_str(&bearer).map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, GatewayApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| GatewayApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| GatewayApiError::RestResponseError(e.to_string()))?;
            Err(GatewayApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.base_url)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Create a new mirror product on the gateway.
    pub async fn create_product(
        &self,
        name: &str,
        description: Option<&str>,
        image_url: Option<&str>,
        metadata: HashMap<String, String>,
    ) -> Result<MirrorProduct, GatewayApiError> {
        let body = json!({
            "name": name,
            "description": description,
            "images": image_url.map(|u| vec![u]),
            "metadata": metadata,
        });
        debug!("Creating mirror product '{name}'");
        let product = self.rest_query::<MirrorProduct, _>(Method::POST, "/products", Some(body)).await?;
        info!("Created mirror product '{name}' with ref {}", product.id);
        Ok(product)
    }

    /// Create a new price for an existing mirror product. Mirror prices are immutable; a price change means a new
    /// price object.
    pub async fn create_price(
        &self,
        mirror_product_ref: &str,
        unit_amount: Money,
        currency: &str,
    ) -> Result<MirrorPrice, GatewayApiError> {
        let body = json!({
            "product": mirror_product_ref,
            "unit_amount": unit_amount.value(),
            "currency": currency,
        });
        debug!("Creating mirror price of {unit_amount} for {mirror_product_ref}");
        let price = self.rest_query::<MirrorPrice, _>(Method::POST, "/prices", Some(body)).await?;
        info!("Created mirror price {} for {mirror_product_ref}", price.id);
        Ok(price)
    }

    /// Apply a partial update to a mirror product.
    pub async fn update_product(
        &self,
        mirror_product_ref: &str,
        update: MirrorProductUpdate,
    ) -> Result<MirrorProduct, GatewayApiError> {
        if update.is_empty() {
            return Err(GatewayApiError::RestRequestError("Empty mirror product update".to_string()));
        }
        let path = format!("/products/{mirror_product_ref}");
        debug!("Updating mirror product {mirror_product_ref}");
        self.rest_query::<MirrorProduct, _>(Method::POST, &path, Some(update)).await
    }

    /// Mark a mirror product as inactive. The gateway does not allow hard deletion of catalog entries that have been
    /// referenced by a session, so deactivation is the strongest removal available.
    pub async fn deactivate_product(&self, mirror_product_ref: &str) -> Result<MirrorProduct, GatewayApiError> {
        let update = MirrorProductUpdate { active: Some(false), ..Default::default() };
        debug!("Deactivating mirror product {mirror_product_ref}");
        let product = self.update_product(mirror_product_ref, update).await?;
        info!("Mirror product {mirror_product_ref} deactivated");
        Ok(product)
    }

    /// Create a hosted checkout session. `metadata` is stored verbatim on the session and echoed back in webhook
    /// events and on retrieval.
    pub async fn create_checkout_session(
        &self,
        line_items: &[SessionLineItem],
        metadata: HashMap<String, String>,
    ) -> Result<CheckoutSession, GatewayApiError> {
        let body = json!({
            "mode": "payment",
            "line_items": line_items,
            "metadata": metadata,
            "success_url": self.config.success_url,
            "cancel_url": self.config.cancel_url,
        });
        debug!("Creating checkout session with {} line item(s)", line_items.len());
        let session = self.rest_query::<CheckoutSession, _>(Method::POST, "/checkout/sessions", Some(body)).await?;
        info!("Created checkout session {}", session.id);
        Ok(session)
    }

    /// Retrieve a checkout session by id. Returns `None` if the gateway has no such session.
    pub async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<CheckoutSession>, GatewayApiError> {
        let path = format!("/checkout/sessions/{session_id}");
        debug!("Fetching checkout session {session_id}");
        match self.rest_query::<CheckoutSession, ()>(Method::GET, &path, None).await {
            Ok(session) => Ok(Some(session)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
