//! Approval lifecycle types.
//!
//! ```text
//! Opening ──present ok──→ AwaitingDecision ──approve──→ Approved
//!    │                          │ ──deny─────→ Rejected
//!    │                          │ ──close────→ Dismissed
//!    └── present failed ─→ (rejected)   └── sweep ──→ TimedOut
//! ```
//!
//! Only the two live states are stored; a terminal transition removes the
//! pending entry, so there is nothing left for a late message to move.

use serde::{Deserialize, Serialize};
use shared_types::{ApprovalKind, BridgeError, CorrelationId, Origin};
use url::form_urlencoded;

/// Live state of a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalState {
    /// Registered; the surface is being created.
    Opening,
    /// Surface is showing; waiting for the user.
    AwaitingDecision,
}

/// Terminal outcome of a pending approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalTerminal {
    Approved,
    Rejected,
    Dismissed,
    TimedOut,
    /// Failed for another reason (surface could not open, host shutdown).
    Aborted,
}

impl ApprovalTerminal {
    /// Classify a rejection error.
    pub fn from_error(error: &BridgeError) -> Self {
        match error {
            BridgeError::UserRejected => ApprovalTerminal::Rejected,
            BridgeError::UserDismissed => ApprovalTerminal::Dismissed,
            BridgeError::Timeout(_) => ApprovalTerminal::TimedOut,
            _ => ApprovalTerminal::Aborted,
        }
    }
}

/// An approved decision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Approval {
    /// Payload supplied by the approval UI (a signature for sign requests).
    pub payload: Option<String>,
}

/// What a waiting dispatcher branch eventually receives.
pub type ApprovalOutcome = Result<Approval, BridgeError>;

/// Everything an approval window needs to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    /// Pending approval this window decides.
    pub request_id: CorrelationId,
    /// Connect or sign.
    pub kind: ApprovalKind,
    /// Requesting origin, shown to the user.
    pub origin: Origin,
    /// Message to sign (sign requests only).
    pub message: Option<String>,
    /// Window width in pixels.
    pub width: u32,
    /// Window height in pixels.
    pub height: u32,
}

impl SurfaceSpec {
    /// UI route, e.g. `popup.html#/sign?origin=…&message=…&requestId=…`.
    pub fn route(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("origin", self.origin.as_str());
        if let Some(message) = &self.message {
            query.append_pair("message", message);
        }
        query.append_pair("requestId", &self.request_id.to_string());
        format!("popup.html#/{}?{}", self.kind.route(), query.finish())
    }
}
