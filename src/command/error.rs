//! Execution errors and their classification into semantic error codes

use intent_bridge_shared::{
    error::status, ChallengeType, ErrorCode, Outcome, RemoteError, StateMap,
};
use thiserror::Error;

/// Everything that can stop a device's command short of success.
///
/// None of these abort the batch; each becomes the device's `ERROR` outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// The caller must resubmit with a PIN or acknowledgment
    #[error("Challenge required: {kind:?}")]
    Challenge {
        kind: ChallengeType,
        /// States computed before the gate failed, reported with the prompt
        states: Option<StateMap>,
    },

    /// Rejected before anything was written
    #[error("Precondition failed: {reason}")]
    Precondition {
        /// Semantic code; `notSupported` when absent
        code: Option<ErrorCode>,
        reason: String,
    },

    /// Registry fetch or command failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Accepted by the registry but the observed state did not follow
    #[error("Command accepted but state did not converge: {code}")]
    Postcondition { code: ErrorCode },
}

impl ExecutionError {
    /// Precondition failure reported as `notSupported`
    pub fn not_supported(reason: impl Into<String>) -> Self {
        Self::Precondition {
            code: None,
            reason: reason.into(),
        }
    }

    /// Target state already reached
    pub fn already(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self::Precondition {
            code: Some(code),
            reason: reason.into(),
        }
    }

    /// Semantic code reported for this failure
    pub fn error_code(&self) -> ErrorCode {
        match self {
            ExecutionError::Challenge { .. } => ErrorCode::ChallengeNeeded,
            ExecutionError::Precondition { code, .. } => {
                code.clone().unwrap_or(ErrorCode::NotSupported)
            }
            ExecutionError::Remote(err) => classify(err),
            ExecutionError::Postcondition { code } => code.clone(),
        }
    }

    /// Per-device outcome for this failure
    pub fn into_outcome(self, device_id: &str) -> Outcome {
        match self {
            ExecutionError::Challenge { kind, states } => {
                Outcome::challenge(device_id, kind, states)
            }
            other => Outcome::error(device_id, other.error_code()),
        }
    }
}

/// Map a registry failure to a semantic error code.
///
/// A code already attached by the remote layer wins over the status code.
pub fn classify(err: &RemoteError) -> ErrorCode {
    if let Some(code) = &err.error_code {
        return code.clone();
    }
    match err.status {
        Some(status::NOT_FOUND) => ErrorCode::DeviceNotFound,
        Some(status::BAD_REQUEST) => ErrorCode::NotSupported,
        _ => ErrorCode::DeviceOffline,
    }
}
