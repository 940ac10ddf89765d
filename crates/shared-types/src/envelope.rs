//! # Message Envelopes
//!
//! Wire shapes for every hop of a wallet call:
//!
//! ```text
//! page ──WindowMessage::Request(RequestFrame)──→ content relay
//!      content relay ──RequestEnvelope + SenderContext──→ wallet host
//!      wallet host ──ResponseEnvelope──→ content relay
//! page ←─WindowMessage::Response(ResponseFrame)── content relay
//! approval UI ──DecisionMessage──→ wallet host
//! ```
//!
//! ## Identity
//!
//! The `SenderContext` is stamped by the transport, never by the page. The
//! host derives the origin from it; the `origin` inside a `RequestEnvelope`
//! must agree or the request is refused.

use crate::errors::BridgeError;
use crate::ids::{CallId, CorrelationId};
use crate::origin::Origin;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// HOST-FACING ENVELOPES
// =============================================================================

/// A wallet request as seen by the privileged dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    /// Method name, e.g. `connect` or `ipfs_add`.
    pub method: String,
    /// Method parameters (an object, possibly empty).
    #[serde(default = "empty_params")]
    pub params: Value,
    /// Calling page origin.
    pub origin: Origin,
}

fn empty_params() -> Value {
    Value::Object(Default::default())
}

impl RequestEnvelope {
    /// Build a request.
    pub fn new(method: impl Into<String>, params: Value, origin: Origin) -> Self {
        Self {
            method: method.into(),
            params,
            origin,
        }
    }
}

/// Exactly one of these answers every request: `{ result }` or `{ error }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseEnvelope {
    /// Successful outcome.
    Success {
        /// Method-specific result.
        result: Value,
    },
    /// Failed outcome.
    Failure {
        /// User-facing message.
        error: String,
        /// Typed failure for callers that want to branch on it.
        reason: BridgeError,
    },
}

impl ResponseEnvelope {
    /// Successful response.
    pub fn success(result: Value) -> Self {
        ResponseEnvelope::Success { result }
    }

    /// Failed response.
    pub fn failure(reason: BridgeError) -> Self {
        ResponseEnvelope::Failure {
            error: reason.to_string(),
            reason,
        }
    }

    /// Whether this is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }

    /// Convert back into a `Result`.
    pub fn into_result(self) -> Result<Value, BridgeError> {
        match self {
            ResponseEnvelope::Success { result } => Ok(result),
            ResponseEnvelope::Failure { reason, .. } => Err(reason),
        }
    }
}

impl From<Result<Value, BridgeError>> for ResponseEnvelope {
    fn from(result: Result<Value, BridgeError>) -> Self {
        match result {
            Ok(value) => ResponseEnvelope::success(value),
            Err(e) => ResponseEnvelope::failure(e),
        }
    }
}

/// Approval decision posted by the approval UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionMessage {
    /// Pending approval this decision is for.
    pub request_id: CorrelationId,
    /// Whether the user approved.
    pub approved: bool,
    /// Optional result payload (a signature for sign approvals).
    #[serde(default)]
    pub payload: Option<String>,
    /// Origin shown to the user; must match the pending request when present.
    #[serde(default)]
    pub origin: Option<Origin>,
}

impl DecisionMessage {
    /// Approve without payload.
    pub fn approve(request_id: CorrelationId) -> Self {
        Self {
            request_id,
            approved: true,
            payload: None,
            origin: None,
        }
    }

    /// Deny.
    pub fn deny(request_id: CorrelationId) -> Self {
        Self {
            request_id,
            approved: false,
            payload: None,
            origin: None,
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Attach the displayed origin.
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }
}

// =============================================================================
// TRANSPORT IDENTITY
// =============================================================================

/// Browser tab a message came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    /// Tab id.
    pub id: u32,
    /// Current tab URL.
    pub url: String,
}

/// Sender identity stamped by the runtime transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderContext {
    /// Extension that owns the sending script.
    pub extension_id: String,
    /// Present for content scripts, absent for extension pages.
    #[serde(default)]
    pub tab: Option<TabInfo>,
}

impl SenderContext {
    /// Content script running in a tab.
    pub fn content_script(extension_id: impl Into<String>, tab_id: u32, url: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            tab: Some(TabInfo {
                id: tab_id,
                url: url.into(),
            }),
        }
    }

    /// Extension page (popup, approval window).
    pub fn extension_page(extension_id: impl Into<String>) -> Self {
        Self {
            extension_id: extension_id.into(),
            tab: None,
        }
    }
}

// =============================================================================
// PAGE WINDOW FRAMES
// =============================================================================

/// A page call posted onto the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestFrame {
    /// Page-side call id.
    pub id: CallId,
    /// Method name.
    pub method: String,
    /// Parameters.
    #[serde(default = "empty_params")]
    pub params: Value,
}

/// A response posted back onto the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    /// Call id copied from the request frame.
    pub id: CallId,
    /// The single response for that call.
    pub response: ResponseEnvelope,
}

/// Everything that travels over the page window channel.
///
/// The window is shared with the page and any other script on it, so
/// listeners must expect frames they did not originate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WindowMessage {
    /// Page → relay.
    #[serde(rename = "BC_EXTENSION_REQUEST")]
    Request(RequestFrame),
    /// Relay → page.
    #[serde(rename = "BC_EXTENSION_RESPONSE")]
    Response(ResponseFrame),
}
