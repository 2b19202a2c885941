/*
[INPUT]:  Error sources (validation, credentials, HTTP transport, API payloads, WebSocket)
[OUTPUT]: Structured error types carrying method/endpoint context
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

use super::client::HttpVerb;

/// Main error type for the Bitstamp adapter
#[derive(Error, Debug)]
pub enum BitstampError {
    /// Client is missing credentials or was configured incorrectly
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied parameter is outside its documented domain
    #[error("Validation error: {0}")]
    Validation(String),

    /// Exchange answered 404 for the requested resource
    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },

    /// Connection, timeout or DNS failure while talking to the exchange
    #[error("Transport error on {method} {endpoint}: {source}")]
    Transport {
        method: HttpVerb,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Internal request construction asked for something unsupported
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// WebSocket error
    #[error("WebSocket error: {0}")]
    WebSocket(String),
}

impl BitstampError {
    /// Check if the error is worth retrying as-is
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BitstampError::Transport { .. } | BitstampError::WebSocket(_)
        )
    }

    /// Check if the error was raised before any network I/O
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BitstampError::Config(_) | BitstampError::Validation(_) | BitstampError::Protocol(_)
        )
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        BitstampError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        BitstampError::Validation(message.into())
    }
}

/// Result type alias for Bitstamp operations
pub type Result<T> = std::result::Result<T, BitstampError>;
