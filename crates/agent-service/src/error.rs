//! Error types for agent service operations

use thiserror::Error;

/// Result type for agent service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while talking to the agent service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Credentials were rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Referenced resource does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl From<agent_utils::EnvError> for ServiceError {
    fn from(err: agent_utils::EnvError) -> Self {
        ServiceError::ConfigurationError(err.to_string())
    }
}
