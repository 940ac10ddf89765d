//! Extension-internal message handler.
//!
//! Serves the trusted wallet UI (popup and approval windows): approval
//! decisions, connected-site management, storage node settings and account
//! management. These messages never come from a page.

use crate::dispatcher::Dispatcher;
use crate::domain::methods::StorageMethod;
use serde_json::{json, Value};
use shared_types::{BridgeError, BridgeResult, InternalRequest, ResponseEnvelope};
use std::sync::Arc;
use tracing::debug;

/// Handles [`InternalRequest`]s.
pub struct InternalHandler {
    dispatcher: Arc<Dispatcher>,
}

impl InternalHandler {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Handle one internal message and produce its single response.
    pub async fn handle(&self, request: InternalRequest) -> ResponseEnvelope {
        let name = request.name();
        let result = self.route(request).await;
        if let Err(e) = &result {
            debug!(message = name, error = %e, "Internal request failed");
        }
        ResponseEnvelope::from(result)
    }

    async fn route(&self, request: InternalRequest) -> BridgeResult<Value> {
        if let Some(decision) = request.as_decision() {
            // Acknowledged whether or not the approval is still pending.
            let applied = self.dispatcher.controller().handle_decision(&decision);
            debug!(request_id = %decision.request_id, applied = applied, "Decision received");
            return Ok(json!({ "success": true }));
        }

        let registry = self.dispatcher.registry();
        let collaborators = self.dispatcher.collaborators();

        match request {
            InternalRequest::ConnectionResponse { .. } | InternalRequest::SignatureResponse { .. } => {
                Ok(json!({ "success": true }))
            }

            InternalRequest::GetConnectedSites => Ok(json!({ "sites": registry.list() })),
            InternalRequest::RevokeSite { origin } => {
                let revoked = registry.revoke(&origin);
                Ok(json!({ "success": true, "revoked": revoked }))
            }

            InternalRequest::GetCurrentNode => {
                self.dispatcher.storage(StorageMethod::GetCurrentNode).await
            }
            InternalRequest::GetNodes => self.dispatcher.storage(StorageMethod::GetNodes).await,
            InternalRequest::GetSelectedNodeId => {
                let node_id = self
                    .dispatcher
                    .call("node registry", collaborators.nodes.selected_id())
                    .await?;
                Ok(json!({ "nodeId": node_id }))
            }
            InternalRequest::SaveNodes { nodes } => {
                if nodes.is_empty() {
                    return Err(BridgeError::InvalidParams("invalid node data".into()));
                }
                self.dispatcher
                    .call("node registry", collaborators.nodes.save_nodes(nodes))
                    .await?;
                Ok(json!({ "success": true }))
            }
            InternalRequest::SetSelectedNodeId { node_id } => {
                if node_id.is_empty() {
                    return Err(BridgeError::InvalidParams("nodeId is required".into()));
                }
                self.dispatcher
                    .call("node registry", collaborators.nodes.set_selected_id(&node_id))
                    .await?;
                Ok(json!({ "success": true }))
            }
            InternalRequest::TestConnection { node_id } => {
                if node_id.is_empty() {
                    return Err(BridgeError::InvalidParams("nodeId is required".into()));
                }
                self.dispatcher
                    .storage(StorageMethod::TestConnection { node_id })
                    .await
            }

            InternalRequest::ListAccounts => {
                let accounts = self
                    .dispatcher
                    .call("account store", collaborators.accounts.list())
                    .await?;
                Ok(json!({ "accounts": accounts }))
            }
            InternalRequest::CurrentAccount => {
                let account = self
                    .dispatcher
                    .call("account store", collaborators.accounts.current())
                    .await?;
                Ok(json!({ "account": account }))
            }
            InternalRequest::SetCurrentAccount { id } => {
                self.dispatcher
                    .call("account store", collaborators.accounts.set_current(&id))
                    .await?;
                Ok(json!({ "success": true }))
            }
            InternalRequest::AddAccount { name } => {
                let account = self
                    .dispatcher
                    .call("account store", collaborators.accounts.add(&name))
                    .await?;
                Ok(json!({ "account": account }))
            }
            InternalRequest::RemoveAccount { id } => {
                let removed = self
                    .dispatcher
                    .call("account store", collaborators.accounts.remove(&id))
                    .await?;
                Ok(json!({ "success": removed }))
            }
        }
    }
}
