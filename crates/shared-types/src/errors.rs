//! # Error Types
//!
//! The caller-visible failure taxonomy. Every failed page call ends as one of
//! these; `Display` is the short user-facing message the page sees.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced to the page.
///
/// Serialized adjacently tagged so the page side can rebuild the typed error:
/// `{"code": "invalid_params", "detail": "content is required"}`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "snake_case")]
pub enum BridgeError {
    /// The origin holds no connection grant.
    #[error("site not connected")]
    NotConnected,

    /// The user explicitly denied the request.
    #[error("user rejected request")]
    UserRejected,

    /// The approval surface closed without a decision.
    #[error("user dismissed request")]
    UserDismissed,

    /// Request parameters were malformed.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The request did not settle in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The privileged context could not be reached.
    #[error("wallet unavailable: {0}")]
    TransportUnavailable(String),

    /// An account, storage or signing collaborator failed.
    #[error("{0}")]
    CollaboratorFailure(String),

    /// The method name is not part of the wallet API.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// A referenced node or content id does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl BridgeError {
    /// Short machine-readable code, matching the serialized tag.
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::NotConnected => "not_connected",
            BridgeError::UserRejected => "user_rejected",
            BridgeError::UserDismissed => "user_dismissed",
            BridgeError::InvalidParams(_) => "invalid_params",
            BridgeError::Timeout(_) => "timeout",
            BridgeError::TransportUnavailable(_) => "transport_unavailable",
            BridgeError::CollaboratorFailure(_) => "collaborator_failure",
            BridgeError::UnsupportedMethod(_) => "unsupported_method",
            BridgeError::NotFound(_) => "not_found",
        }
    }

    /// True for outcomes the user produced (deny or dismiss).
    pub fn is_user_decision(&self) -> bool {
        matches!(self, BridgeError::UserRejected | BridgeError::UserDismissed)
    }
}

/// Result alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
