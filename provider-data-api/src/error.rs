//! Error types for the data API provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Data API provider errors
#[derive(Error, Debug)]
pub enum DataApiError {
    /// API key rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error
    #[error("Data API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Retries exhausted on 429 / 5xx
    #[error("Request to {endpoint} failed after {attempts} attempts (last status {status_code})")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        status_code: u16,
    },

    /// Content request matched no object
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for data API operations
pub type Result<T> = std::result::Result<T, DataApiError>;

impl From<DataApiError> for BridgeError {
    fn from(error: DataApiError) -> Self {
        match error {
            DataApiError::AuthenticationFailed(msg) => BridgeError::Unauthorized(msg),
            DataApiError::BridgeError(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
