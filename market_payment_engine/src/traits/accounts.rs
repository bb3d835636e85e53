use thiserror::Error;

use crate::db_types::{Address, Client, Seller};

/// Lookups against the client / seller / address collaborators. These records are owned by routine CRUD elsewhere;
/// the checkout pipeline only ever needs existence and ownership checks, so everything here returns `Option`.
#[allow(async_fn_in_trait)]
pub trait AccountManagement {
    async fn fetch_client_by_user_id(&self, user_id: &str) -> Result<Option<Client>, AccountApiError>;

    async fn fetch_client_by_id(&self, client_id: i64) -> Result<Option<Client>, AccountApiError>;

    async fn fetch_seller_by_user_id(&self, user_id: &str) -> Result<Option<Seller>, AccountApiError>;

    async fn fetch_address_by_id(&self, address_id: i64) -> Result<Option<Address>, AccountApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum AccountApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for AccountApiError {
    fn from(e: sqlx::Error) -> Self {
        AccountApiError::DatabaseError(e.to_string())
    }
}
