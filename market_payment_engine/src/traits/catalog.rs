use thiserror::Error;

use crate::{
    db_types::{NewProduct, Product, ProductUpdate},
    traits::{GatewayClientError, MirrorRefs},
};

/// Storage behaviour for the locally-authoritative product catalog.
///
/// Creation is two-phase with explicit compensation (see [`CatalogApi`](crate::CatalogApi)): a row inserted by
/// [`insert_product`](CatalogManagement::insert_product) has no mirror refs yet and is invisible to every read path
/// until [`set_mirror_refs`](CatalogManagement::set_mirror_refs) lands. If the mirror write fails, the caller deletes
/// the row again and no other request ever observed it.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches a single sellable product. Rows without mirror refs are not returned.
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogApiError>;

    /// Batch lookup of sellable products. The result preserves no particular order and silently omits ids that do
    /// not exist; callers diff against their input to report missing ids.
    async fn fetch_products_by_ids(&self, product_ids: &[i64]) -> Result<Vec<Product>, CatalogApiError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;

    async fn set_mirror_refs(&self, product_id: i64, refs: &MirrorRefs) -> Result<Product, CatalogApiError>;

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError>;

    /// Deletes the row. Returns `false` if it did not exist.
    async fn delete_product(&self, product_id: i64) -> Result<bool, CatalogApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("No seller profile exists for user {0}")]
    SellerNotFound(String),
    #[error("The update contains no fields to change")]
    EmptyUpdate,
    #[error("Access denied. {0}")]
    Forbidden(String),
    #[error("Payment gateway error. {0}")]
    GatewayError(#[from] GatewayClientError),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

impl From<super::AccountApiError> for CatalogApiError {
    fn from(e: super::AccountApiError) -> Self {
        match e {
            super::AccountApiError::DatabaseError(e) => CatalogApiError::DatabaseError(e),
        }
    }
}
