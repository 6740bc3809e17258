//! Application error types

use courier_domain::DomainError;
use thiserror::Error;

use crate::ports::{BackendError, StorageError, TransportError};

/// Application-level errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplicationError {
    /// The operation needs a signed-in user.
    #[error("sign in required")]
    AuthRequired,

    /// The URL still contains `{{key}}` tokens with no value.
    #[error("URL contains unresolved environment variables: {}", keys.join(", "))]
    UnresolvedTemplate {
        /// Unresolved keys in first-appearance order.
        keys: Vec<String>,
    },

    /// The backend could not be reached.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The backend answered with an error.
    #[error("server error ({status}): {message}")]
    ServerError {
        /// HTTP status of the failed call.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// Input was rejected before any call was made.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The referenced item does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A send is already outstanding on this client.
    #[error("a request is already in flight")]
    SendInFlight,

    /// A domain value could not be parsed.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

impl From<BackendError> for ApplicationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Network(message) => Self::NetworkFailure(message),
            BackendError::Server { status, message } => Self::ServerError { status, message },
            BackendError::Unauthorized => Self::AuthRequired,
            BackendError::Malformed(message) => {
                Self::NetworkFailure(format!("malformed response: {message}"))
            }
        }
    }
}

impl From<TransportError> for ApplicationError {
    fn from(err: TransportError) -> Self {
        Self::NetworkFailure(err.message)
    }
}

impl From<StorageError> for ApplicationError {
    fn from(err: StorageError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
