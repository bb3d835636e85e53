use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use mps_common::Money;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------      Client        ----------------------------------------------------------
/// A purchaser. `user_id` links to the identity owned by the auth collaborator; email and phone are kept here so that
/// orders can snapshot them without reaching into the auth system.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub user_id: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Seller        ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seller {
    pub id: i64,
    pub user_id: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Address       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub client_id: i64,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      Product       ----------------------------------------------------------
/// A locally-stored product. `mirror_product_ref`/`mirror_price_ref` point at the gateway's mirrored representation.
/// Every product that is visible to carts and checkout carries both refs; a row without them only exists inside the
/// creation window and is filtered out of all read paths.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub seller_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub mirror_product_ref: Option<String>,
    pub mirror_price_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub seller_id: i64,
    pub category_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Money,
    pub stock: i64,
}

/// Partial product update. Empty updates are rejected before touching the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.description.is_none() &&
            self.image_url.is_none() &&
            self.price.is_none() &&
            self.stock.is_none()
    }
}

//--------------------------------------       Cart         ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub client_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: i64,
    pub quantity: i64,
}

/// A cart together with its items, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCart {
    pub cart: Cart,
    pub items: Vec<CartItem>,
}

//--------------------------------------   OrderStatus      ----------------------------------------------------------
/// The order workflow. Orders are materialized from a *completed* payment session, so they enter the system as
/// `Paid`; `Pending` exists for orders created ahead of payment confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
    Fulfilled,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The allowed transition table. `Cancelled` is reachable from any pre-fulfillment state; everything else moves
    /// strictly forward.
    pub fn can_transition_to(&self, new: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, new),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, Fulfilled) | (Paid, Cancelled) | (Fulfilled, Shipped) |
                (Shipped, Delivered)
        )
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Fulfilled => write!(f, "Fulfilled"),
            OrderStatus::Shipped => write!(f, "Shipped"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct OrderStatusParseError(String);

impl FromStr for OrderStatus {
    type Err = OrderStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Paid" => Ok(OrderStatus::Paid),
            "Fulfilled" => Ok(OrderStatus::Fulfilled),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            s => Err(OrderStatusParseError(s.to_string())),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status in store: {value}. Defaulting to Pending");
            OrderStatus::Pending
        })
    }
}

//--------------------------------------       Order        ----------------------------------------------------------
/// A durable, authoritative order. `gateway_session_id` is unique: redelivered completion events for the same session
/// can never materialize a second order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub gateway_session_id: String,
    pub client_id: i64,
    pub address_id: i64,
    pub total: Money,
    pub status: OrderStatus,
    pub is_guest: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub gateway_session_id: String,
    pub client_id: i64,
    pub address_id: i64,
    pub total: Money,
    pub is_guest: bool,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// An immutable snapshot of one purchased line. Name and unit price are copied at finalization so historical orders
/// stay displayable and correctly priced after the product is repriced or deleted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// An order together with its line items, as returned to clients and sellers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// One sold line item for a seller's sales view, joined with the owning order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SellerSale {
    pub order_id: i64,
    pub order_status: OrderStatus,
    pub order_created_at: DateTime<Utc>,
    pub client_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

//--------------------------------------  CheckoutManifest  ----------------------------------------------------------
/// The frozen list of (product, quantity, price-at-checkout) captured when a payment session is created. It rides on
/// the session as opaque metadata and is the *sole* basis for order creation; the live cart plays no further role
/// once the session exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutManifest {
    pub items: Vec<ManifestEntry>,
    /// The purchasing client, recorded so the webhook path can finalize without a client round-trip.
    pub client_id: Option<i64>,
    /// The delivery address chosen at checkout.
    pub address_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
}

impl CheckoutManifest {
    pub fn product_ids(&self) -> Vec<i64> {
        self.items.iter().map(|e| e.product_id).collect()
    }

    /// The authoritative order total: Σ quantity × unit-price-at-checkout.
    pub fn total(&self) -> Money {
        self.items.iter().map(|e| e.unit_price * e.quantity).sum()
    }
}
