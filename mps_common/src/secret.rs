//! Wrapper for credentials (gateway API keys, webhook signing secrets) that must never leak into logs.
use std::fmt::{self, Debug, Display};

/// An opaque credential. `Debug` and `Display` both redact the value, so a `Secret` can ride inside config structs
/// that derive `Debug` and get logged at startup. Call [`Secret::reveal`] at the point of use.
#[derive(Clone, Default)]
pub struct Secret(String);

impl Secret {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    /// Loads a credential from the named environment variable. Unset and blank both come back as `None`, so the
    /// caller can warn with context and fall back explicitly.
    pub fn from_env(var: &str) -> Option<Self> {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Some(Self(value)),
            _ => None,
        }
    }

    pub fn reveal(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

impl Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}
