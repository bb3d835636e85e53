use std::collections::HashMap;

use mps_common::Money;
use serde::{Deserialize, Serialize};

use crate::GatewayApiError;

/// The gateway's representation of a sellable item. The local product id travels in the metadata so that a mirror can
/// always be traced back to its source row.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MirrorProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

fn default_active() -> bool {
    true
}

/// A price attached to a mirror product. Amounts are always in minor units.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MirrorPrice {
    pub id: String,
    pub product: String,
    pub unit_amount: Money,
    pub currency: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Partial update for a mirror product. `None` fields are omitted from the request body entirely.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MirrorProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl MirrorProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.images.is_none() && self.active.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    NoPaymentRequired,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Unpaid
    }
}

/// A line item submitted when creating a checkout session. The name and unit price are whatever the caller captured
/// from the local catalog at session-creation time; the gateway never sees a client-supplied price.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionLineItem {
    pub name: String,
    pub unit_amount: Money,
    pub currency: String,
    pub quantity: i64,
}

/// A gateway-hosted checkout session. The `metadata` map is opaque to the gateway and is echoed back verbatim on
/// retrieval and in webhook events.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// An asynchronous notification from the gateway. The event `data.object` payload depends on the event type;
/// checkout-related events carry a [`CheckoutSession`].
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl GatewayEvent {
    /// Interpret the event payload as a checkout session. Fails if the `data.object` does not have the session shape.
    pub fn checkout_session(&self) -> Result<CheckoutSession, GatewayApiError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| GatewayApiError::JsonError(format!("Event {} does not carry a checkout session. {e}", self.id)))
    }
}
