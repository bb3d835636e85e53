use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST request: {0}")]
    RestRequestError(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The gateway did not respond within the configured timeout")]
    Timeout,
}

impl GatewayApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayApiError::QueryError { status: 404, .. })
    }
}

impl From<reqwest::Error> for GatewayApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayApiError::Timeout
        } else {
            GatewayApiError::RestResponseError(e.to_string())
        }
    }
}
