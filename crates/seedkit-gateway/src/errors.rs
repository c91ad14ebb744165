use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single gateway call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportError {
    /// The request did not produce a response (connect, timeout, reset).
    #[error("request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },
    /// The backend answered with a non-success status.
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response body did not match the expected payload.
    #[error("failed to decode {endpoint} response: {message}")]
    Decode { endpoint: String, message: String },
}

impl TransportError {
    pub fn endpoint(&self) -> &str {
        match self {
            TransportError::Request { endpoint, .. }
            | TransportError::Status { endpoint, .. }
            | TransportError::Decode { endpoint, .. } => endpoint,
        }
    }
}

/// Errors raised while building a gateway binding.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid base url: {0}")]
    BaseUrl(String),
}
