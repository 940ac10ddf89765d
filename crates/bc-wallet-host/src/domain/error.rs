//! Wallet host error types.
//!
//! `BridgeError` (in shared-types) is what pages see. The types here are
//! internal: collaborator failures before they are mapped, and host
//! lifecycle errors.

use shared_types::BridgeError;

/// Failure reported by an account, storage, signing or surface collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// Backend not reachable.
    #[error("{0}")]
    Unavailable(String),

    /// Referenced record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Input refused by the collaborator.
    #[error("{0}")]
    Invalid(String),

    /// Operation not allowed in the current state (e.g. removing the last account).
    #[error("{0}")]
    Refused(String),
}

impl From<CollaboratorError> for BridgeError {
    fn from(e: CollaboratorError) -> Self {
        match e {
            CollaboratorError::NotFound(what) => BridgeError::NotFound(what),
            CollaboratorError::Invalid(why) => BridgeError::InvalidParams(why),
            CollaboratorError::Unavailable(why) | CollaboratorError::Refused(why) => {
                BridgeError::CollaboratorFailure(why)
            }
        }
    }
}

/// Host-level errors (not sent to pages).
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] crate::domain::config::ConfigError),

    /// Host already started
    #[error("wallet host already running")]
    AlreadyRunning,

    /// Shutdown in progress
    #[error("shutdown in progress")]
    ShuttingDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collaborator_mapping() {
        assert_eq!(
            BridgeError::from(CollaboratorError::NotFound("node 9".into())),
            BridgeError::NotFound("node 9".into())
        );
        assert_eq!(
            BridgeError::from(CollaboratorError::Invalid("bad cid".into())),
            BridgeError::InvalidParams("bad cid".into())
        );
        assert_eq!(
            BridgeError::from(CollaboratorError::Unavailable("connection timed out".into())),
            BridgeError::CollaboratorFailure("connection timed out".into())
        );
    }

    #[test]
    fn test_message_passthrough() {
        let err = BridgeError::from(CollaboratorError::Refused("cannot remove the only account".into()));
        assert_eq!(err.to_string(), "cannot remove the only account");
    }
}
