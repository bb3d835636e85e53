use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use market_payment_engine::traits::{CartApiError, CatalogApiError, GatewayClientError, OrderApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Invalid request. {0}")]
    InvalidArgument(String),
    #[error("The request conflicts with the current state. {0}")]
    Conflict(String),
    #[error("The payment gateway is unavailable. {0}")]
    GatewayUnavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingUserId => StatusCode::UNAUTHORIZED,
                AuthError::MalformedUserId(_) => StatusCode::BAD_REQUEST,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No user id was supplied with the request.")]
    MissingUserId,
    #[error("The supplied user id is not valid. {0}")]
    MalformedUserId(String),
}

impl From<CartApiError> for ServerError {
    fn from(e: CartApiError) -> Self {
        match e {
            CartApiError::DatabaseError(e) => Self::BackendError(e),
            CartApiError::ClientNotFound(_) => Self::NoRecordFound(e.to_string()),
            CartApiError::CartNotFound(_) | CartApiError::CartItemNotFound(_) => Self::NoRecordFound(e.to_string()),
            CartApiError::CartAlreadyExists(_) => Self::Conflict(e.to_string()),
            CartApiError::MissingProducts(_) |
            CartApiError::InvalidQuantity(_) |
            CartApiError::EmptyCart => Self::InvalidArgument(e.to_string()),
            CartApiError::Forbidden(_) => Self::InsufficientPermissions(e.to_string()),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::DatabaseError(e) => Self::BackendError(e),
            CatalogApiError::ProductNotFound(_) => Self::NoRecordFound(e.to_string()),
            CatalogApiError::SellerNotFound(_) => Self::InsufficientPermissions(e.to_string()),
            CatalogApiError::EmptyUpdate => Self::InvalidArgument(e.to_string()),
            CatalogApiError::Forbidden(_) => Self::InsufficientPermissions(e.to_string()),
            CatalogApiError::GatewayError(e) => e.into(),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::DatabaseError(e) => Self::BackendError(e),
            OrderApiError::SessionNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderApiError::SessionNotCompleted(_) |
            OrderApiError::ManifestMissing(_) |
            OrderApiError::EmptyCheckout |
            OrderApiError::InvalidQuantity(_) |
            OrderApiError::MissingProducts(_) |
            OrderApiError::AddressNotFound(_) => Self::InvalidArgument(e.to_string()),
            OrderApiError::ClientNotFound(_) | OrderApiError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderApiError::AddressNotOwned { .. } | OrderApiError::Forbidden(_) => {
                Self::InsufficientPermissions(e.to_string())
            },
            OrderApiError::InsufficientStock(_) | OrderApiError::InvalidStatusTransition { .. } => {
                Self::Conflict(e.to_string())
            },
            OrderApiError::GatewayError(e) => e.into(),
        }
    }
}

impl From<GatewayClientError> for ServerError {
    fn from(e: GatewayClientError) -> Self {
        Self::GatewayUnavailable(e.to_string())
    }
}
