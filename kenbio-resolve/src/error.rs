//! Provider error taxonomy
//!
//! These errors never cross the public component boundary. Each service
//! converts them into its empty/`None` result and logs the cause.

use thiserror::Error;

/// Result of a single upstream call
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Upstream provider errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection, DNS or TLS failure
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Provider answered 404 for the requested entity
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response
    #[error("Provider returned HTTP {0}: {1}")]
    Status(u16, String),

    /// Body could not be decoded into the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request could not be built (bad base URL, bad multipart part, ...)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// True when the provider affirmatively said the entity does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout(e.to_string())
        } else if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else if e.is_builder() {
            ProviderError::InvalidRequest(e.to_string())
        } else {
            ProviderError::Network(e.to_string())
        }
    }
}
