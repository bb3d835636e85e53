use std::fmt::Display;

use market_payment_engine::db_types::{NewCartItem, NewProduct, OrderStatus};
use mps_common::Money;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCartRequest {
    pub items: Vec<NewCartItem>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub address_id: i64,
    pub items: Vec<NewCartItem>,
}

/// Product creation payload. The seller is taken from the authenticated caller, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductRequest {
    pub category_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub price: Money,
    pub stock: i64,
}

impl From<NewProductRequest> for NewProduct {
    fn from(r: NewProductRequest) -> Self {
        NewProduct {
            seller_id: 0,
            category_id: r.category_id,
            name: r.name,
            description: r.description,
            image_url: r.image_url,
            price: r.price,
            stock: r.stock,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}
