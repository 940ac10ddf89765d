//! # Runtime IPC Payloads
//!
//! Messages carried on the runtime channel into the wallet host. Page calls
//! arrive relayed by a content script; everything else comes from trusted
//! extension pages (popup, approval window).

use crate::entities::StorageNode;
use crate::envelope::{DecisionMessage, RequestEnvelope};
use crate::ids::{CallId, CorrelationId};
use crate::origin::Origin;
use serde::{Deserialize, Serialize};

/// Payload of one runtime message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuntimePayload {
    /// A page call relayed by a content script.
    PageRequest {
        /// Page-side call id, echoed for logging only.
        call_id: CallId,
        /// The request.
        request: RequestEnvelope,
    },
    /// A message from an extension page.
    Internal(InternalRequest),
}

/// Requests from trusted extension pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InternalRequest {
    // =========================================================================
    // APPROVAL DECISIONS
    // =========================================================================
    /// Decision from a connect approval window.
    #[serde(rename = "connection_response", rename_all = "camelCase")]
    ConnectionResponse {
        request_id: CorrelationId,
        approved: bool,
        #[serde(default)]
        origin: Option<Origin>,
    },

    /// Decision from a sign approval window.
    #[serde(rename = "signature_response", rename_all = "camelCase")]
    SignatureResponse {
        request_id: CorrelationId,
        approved: bool,
        #[serde(default)]
        signature: Option<String>,
    },

    // =========================================================================
    // CONNECTED SITES
    // =========================================================================
    /// List origins holding a grant.
    #[serde(rename = "getConnectedSites")]
    GetConnectedSites,

    /// Drop an origin's grant.
    #[serde(rename = "revokeSite")]
    RevokeSite { origin: Origin },

    // =========================================================================
    // STORAGE NODES
    // =========================================================================
    #[serde(rename = "getCurrentIpfsNode")]
    GetCurrentNode,

    #[serde(rename = "getIpfsNodes")]
    GetNodes,

    #[serde(rename = "getSelectedIpfsNodeId")]
    GetSelectedNodeId,

    #[serde(rename = "saveIpfsNodes")]
    SaveNodes {
        #[serde(default)]
        nodes: Vec<StorageNode>,
    },

    #[serde(rename = "setSelectedIpfsNodeId", rename_all = "camelCase")]
    SetSelectedNodeId {
        #[serde(default)]
        node_id: String,
    },

    #[serde(rename = "testIpfsConnection", rename_all = "camelCase")]
    TestConnection {
        #[serde(default)]
        node_id: String,
    },

    // =========================================================================
    // ACCOUNTS
    // =========================================================================
    #[serde(rename = "listAccounts")]
    ListAccounts,

    #[serde(rename = "getCurrentAccount")]
    CurrentAccount,

    #[serde(rename = "setCurrentAccount")]
    SetCurrentAccount { id: String },

    #[serde(rename = "addAccount")]
    AddAccount { name: String },

    #[serde(rename = "removeAccount")]
    RemoveAccount { id: String },
}

impl InternalRequest {
    /// Decision carried by this message, if it is one.
    pub fn as_decision(&self) -> Option<DecisionMessage> {
        match self {
            InternalRequest::ConnectionResponse {
                request_id,
                approved,
                origin,
            } => Some(DecisionMessage {
                request_id: *request_id,
                approved: *approved,
                payload: None,
                origin: origin.clone(),
            }),
            InternalRequest::SignatureResponse {
                request_id,
                approved,
                signature,
            } => Some(DecisionMessage {
                request_id: *request_id,
                approved: *approved,
                payload: signature.clone(),
                origin: None,
            }),
            _ => None,
        }
    }

    /// Message type name, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            InternalRequest::ConnectionResponse { .. } => "connection_response",
            InternalRequest::SignatureResponse { .. } => "signature_response",
            InternalRequest::GetConnectedSites => "getConnectedSites",
            InternalRequest::RevokeSite { .. } => "revokeSite",
            InternalRequest::GetCurrentNode => "getCurrentIpfsNode",
            InternalRequest::GetNodes => "getIpfsNodes",
            InternalRequest::GetSelectedNodeId => "getSelectedIpfsNodeId",
            InternalRequest::SaveNodes { .. } => "saveIpfsNodes",
            InternalRequest::SetSelectedNodeId { .. } => "setSelectedIpfsNodeId",
            InternalRequest::TestConnection { .. } => "testIpfsConnection",
            InternalRequest::ListAccounts => "listAccounts",
            InternalRequest::CurrentAccount => "getCurrentAccount",
            InternalRequest::SetCurrentAccount { .. } => "setCurrentAccount",
            InternalRequest::AddAccount { .. } => "addAccount",
            InternalRequest::RemoveAccount { .. } => "removeAccount",
        }
    }
}
