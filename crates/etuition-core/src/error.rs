//! Error types for the eTuition client.
//!
//! Failures are split by how the caller is expected to react: a transport
//! failure never touches the session, an auth rejection has already cleared it,
//! and client/server errors carry whatever the backend said.

use std::fmt;
use thiserror::Error;

/// The unified error type for eTuition operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No response was obtained (DNS, TLS, connection refused, timeout).
    #[error("network error: {message}")]
    Network { message: String },

    /// The backend answered 401 or 403. The session has been logged out.
    #[error("authentication rejected: {0}")]
    AuthRejected(ApiError),

    /// Any other 4xx response.
    #[error("request rejected: {0}")]
    Client(ApiError),

    /// 5xx (or otherwise unexpected non-2xx) response.
    #[error("server error: {0}")]
    Server(ApiError),

    /// A successful response whose body did not match the expected shape.
    #[error("failed to decode response: {message}")]
    Decode { message: String },

    /// The role lookup answered but carried no usable role.
    #[error("role lookup failed: {reason}")]
    RoleLookup { reason: String },

    /// Input validation errors (base URL, email, path, header value).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Build the error matching a non-2xx status.
    pub fn from_status(error: ApiError) -> Self {
        match error.status {
            401 | 403 => Error::AuthRejected(error),
            400..=499 => Error::Client(error),
            _ => Error::Server(error),
        }
    }

    /// HTTP status of the response, or `None` when no response was received.
    pub fn status(&self) -> Option<u16> {
        self.api_error().map(|e| e.status)
    }

    /// The backend's error details, when the failure came from a response.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::AuthRejected(e) | Error::Client(e) | Error::Server(e) => Some(e),
            _ => None,
        }
    }

    /// Check if the backend rejected the credential (401/403).
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Error::AuthRejected(_))
    }

    /// Check if the request never got a response.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }
}

/// Details of a non-2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Server-provided message, or the canonical reason phrase.
    pub message: String,
    /// The raw JSON error body, if the server sent one.
    pub payload: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, message: impl Into<String>, payload: Option<serde_json::Value>) -> Self {
        Self {
            status,
            message: message.into(),
            payload,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid email address.
    #[error("invalid email '{value}': {reason}")]
    Email { value: String, reason: String },

    /// Invalid request path.
    #[error("invalid path '{value}': {reason}")]
    Path { value: String, reason: String },

    /// A header name or value that cannot be sent.
    #[error("invalid header '{name}': {reason}")]
    Header { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
