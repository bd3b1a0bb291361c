//! Errors raised at the item registry boundary

use thiserror::Error;

use crate::ErrorCode;

/// Status codes the registry reports for failed requests
pub mod status {
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
}

/// A failed fetch or command against the item registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Registry request failed (status: {status:?}, code: {error_code:?}): {message}")]
pub struct RemoteError {
    /// Status code returned by the registry, if a response was received at all
    pub status: Option<u16>,
    /// Semantic code already attached by the remote layer
    pub error_code: Option<ErrorCode>,
    pub message: String,
}

impl RemoteError {
    /// Failure with a registry status code
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            error_code: None,
            message: message.into(),
        }
    }

    /// Failure that already carries its semantic code
    pub fn with_code(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            status: None,
            error_code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Failure without any response (timeout, refused connection)
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            status: None,
            error_code: None,
            message: message.into(),
        }
    }

    pub fn not_found(item_name: &str) -> Self {
        Self::status(status::NOT_FOUND, format!("Item {item_name} does not exist"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(status::BAD_REQUEST, message)
    }
}
