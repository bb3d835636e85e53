use mps_common::Money;
use serde::{Deserialize, Serialize};

use crate::db_types::CheckoutManifest;

/// The pair of gateway identifiers a mirrored product carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRefs {
    pub product_ref: String,
    pub price_ref: String,
}

/// Fields pushed to the gateway when a local product changes. Price changes are handled separately, since mirror
/// prices are immutable on the gateway side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl MirrorUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.image_url.is_none()
    }
}

/// One line of a checkout session as sent to the gateway: the product's display name and the price captured from the
/// local store at session-creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLineItem {
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

/// A freshly-created checkout session: the id that webhook events will reference, and the URL to redirect the
/// shopper to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGatewaySession {
    pub session_id: String,
    pub redirect_url: String,
}

/// A checkout session as retrieved from the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySession {
    pub session_id: String,
    /// True once the gateway has captured payment for this session.
    pub paid: bool,
    /// The manifest decoded from session metadata, if present and well-formed.
    pub manifest: Option<CheckoutManifest>,
}
