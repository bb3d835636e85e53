//! Request identity.
//!
//! The server sits behind an authenticating proxy that terminates sessions and injects the caller's stable user id
//! into the `x-user-id` header. [`UserContext`] extracts that id; whether the id maps to a client or seller profile
//! (or both) is decided per-operation by the engine.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use log::debug;

use crate::errors::{AuthError, ServerError};

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
}

impl FromRequest for UserContext {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.headers().get(USER_ID_HEADER) {
            None => Err(AuthError::MissingUserId.into()),
            Some(value) => match value.to_str() {
                Ok(id) if !id.trim().is_empty() => Ok(UserContext { user_id: id.trim().to_string() }),
                Ok(_) => Err(AuthError::MissingUserId.into()),
                Err(e) => {
                    debug!("💻️ Could not read the {USER_ID_HEADER} header. {e}");
                    Err(AuthError::MalformedUserId(e.to_string()).into())
                },
            },
        };
        ready(result)
    }
}
