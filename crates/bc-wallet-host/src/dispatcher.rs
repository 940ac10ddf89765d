//! # Privileged Dispatcher
//!
//! Single entry point for page requests inside the wallet host. Each call
//! to [`Dispatcher::dispatch`] produces exactly one [`ResponseEnvelope`]:
//! handlers return a `Result`, and the envelope is built from it once.
//!
//! | Method | Grant | Approval | Result |
//! |--------|-------|----------|--------|
//! | `connect` | no | Connect surface | `{success: true}` |
//! | `getAccounts` | yes | no | `{accounts}` |
//! | `signMessage` | yes | Sign surface | `{signature}` |
//! | `ipfs_*` | no | no | storage collaborator result |

use crate::domain::approval::{Approval, ApprovalOutcome};
use crate::domain::capability::CapabilityRegistry;
use crate::domain::methods::{Method, StorageMethod};
use crate::ports::outbound::{
    AccountStore, CollaboratorResult, ContentStore, MessageSigner, NodeRegistry,
};
use crate::surface::{ApprovalController, OpenedApproval};
use serde_json::{json, Value};
use shared_types::{
    ApprovalKind, BridgeError, BridgeResult, Origin, RequestEnvelope, ResponseEnvelope, StorageNode,
};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Collaborators the dispatcher calls out to.
#[derive(Clone)]
pub struct Collaborators {
    pub accounts: Arc<dyn AccountStore>,
    pub nodes: Arc<dyn NodeRegistry>,
    pub content: Arc<dyn ContentStore>,
    pub signer: Arc<dyn MessageSigner>,
}

/// Dispatcher statistics.
#[derive(Debug, Default)]
pub struct DispatchStats {
    pub total_requests: AtomicU64,
    pub total_succeeded: AtomicU64,
    pub total_failed: AtomicU64,
}

/// Authorizes and answers page requests.
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    controller: Arc<ApprovalController>,
    collaborators: Collaborators,
    collaborator_timeout: Duration,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CapabilityRegistry>,
        controller: Arc<ApprovalController>,
        collaborators: Collaborators,
        collaborator_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            controller,
            collaborators,
            collaborator_timeout,
            stats: DispatchStats::default(),
        }
    }

    /// Handle one page request and produce its single response.
    pub async fn dispatch(&self, request: RequestEnvelope) -> ResponseEnvelope {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);
        let origin = request.origin.clone();
        let method = request.method.clone();

        let result = self.handle(request).await;
        match &result {
            Ok(_) => {
                self.stats.total_succeeded.fetch_add(1, Ordering::Relaxed);
                debug!(origin = %origin, method = %method, "Request succeeded");
            }
            Err(e) => {
                self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
                debug!(origin = %origin, method = %method, code = e.code(), error = %e, "Request failed");
            }
        }
        ResponseEnvelope::from(result)
    }

    async fn handle(&self, request: RequestEnvelope) -> BridgeResult<Value> {
        let method = Method::parse(&request.method, &request.params)?;
        let origin = request.origin;

        if method.requires_grant() && !self.registry.is_granted(&origin) {
            debug!(origin = %origin, method = method.name(), "Origin not connected");
            return Err(BridgeError::NotConnected);
        }

        match method {
            Method::Connect => self.connect(origin).await,
            Method::GetAccounts => {
                let accounts = self
                    .call("account store", self.collaborators.accounts.list())
                    .await?;
                Ok(json!({ "accounts": accounts }))
            }
            Method::SignMessage { message } => self.sign(origin, message).await,
            Method::Storage(storage) => self.storage(storage).await,
        }
    }

    async fn connect(&self, origin: Origin) -> BridgeResult<Value> {
        let opened = self.controller.open(ApprovalKind::Connect, origin.clone(), None);
        await_approval(opened).await?;

        self.registry.grant(origin);
        Ok(json!({ "success": true }))
    }

    async fn sign(&self, origin: Origin, message: String) -> BridgeResult<Value> {
        let opened = self
            .controller
            .open(ApprovalKind::Sign, origin.clone(), Some(message.clone()));
        let Approval { payload } = await_approval(opened).await?;

        let signature = match payload {
            Some(signature) => signature,
            None => {
                let account = self
                    .call("account store", self.collaborators.accounts.current())
                    .await?;
                self.call("signer", self.collaborators.signer.sign(&account, &message))
                    .await?
            }
        };

        info!(origin = %origin, "Message signed");
        Ok(json!({ "signature": signature }))
    }

    /// Run a storage method. Also used by the extension-internal handler.
    pub async fn storage(&self, method: StorageMethod) -> BridgeResult<Value> {
        match method {
            StorageMethod::GetCurrentNode => {
                let current = self.current_node().await?;
                Ok(json!({ "currentNode": current }))
            }
            StorageMethod::GetNodes => {
                let nodes = self.call("node registry", self.collaborators.nodes.nodes()).await?;
                Ok(json!({ "nodes": nodes }))
            }
            StorageMethod::SwitchNode { node_id } => {
                let node = self.find_node(&node_id).await?;
                self.call(
                    "node registry",
                    self.collaborators.nodes.set_selected_id(&node.id),
                )
                .await?;
                info!(node = %node.id, "Storage node switched");
                Ok(json!({ "success": true, "node": node }))
            }
            StorageMethod::Add(request) => {
                let stored = self
                    .call("content store", self.collaborators.content.store(request))
                    .await?;
                Ok(json!({ "cid": stored.cid, "size": stored.size }))
            }
            StorageMethod::Get { cid } => {
                let content = self
                    .call("content store", self.collaborators.content.retrieve(&cid))
                    .await?;
                Ok(json!({
                    "content": content.content,
                    "name": content.name,
                    "mimeType": content.mime_type,
                }))
            }
            StorageMethod::TestConnection { node_id } => {
                let node = self.find_node(&node_id).await?;
                let reachable = self
                    .call(
                        "content store",
                        self.collaborators.content.test_connection(&node),
                    )
                    .await?;
                if !reachable {
                    return Err(BridgeError::CollaboratorFailure(
                        "connection timed out or failed".into(),
                    ));
                }
                Ok(json!({ "success": true, "node": node }))
            }
        }
    }

    /// Selected node, or `None` when the selection names no known node.
    pub async fn current_node(&self) -> BridgeResult<Option<StorageNode>> {
        let selected = self
            .call("node registry", self.collaborators.nodes.selected_id())
            .await?;
        let nodes = self.call("node registry", self.collaborators.nodes.nodes()).await?;
        Ok(nodes.into_iter().find(|n| n.id == selected))
    }

    async fn find_node(&self, node_id: &str) -> BridgeResult<StorageNode> {
        let nodes = self.call("node registry", self.collaborators.nodes.nodes()).await?;
        nodes
            .into_iter()
            .find(|n| n.id == node_id)
            .ok_or_else(|| BridgeError::NotFound(format!("node {node_id}")))
    }

    /// Run a collaborator call under the collaborator timeout.
    pub async fn call<T, F>(&self, what: &str, call: F) -> BridgeResult<T>
    where
        F: Future<Output = CollaboratorResult<T>>,
    {
        match tokio::time::timeout(self.collaborator_timeout, call).await {
            Ok(result) => result.map_err(BridgeError::from),
            Err(_) => Err(BridgeError::Timeout(format!("{what} did not respond"))),
        }
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    pub fn controller(&self) -> &Arc<ApprovalController> {
        &self.controller
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }
}

/// Wait for the single outcome of an approval.
async fn await_approval(opened: OpenedApproval) -> ApprovalOutcome {
    opened
        .outcome
        .await
        .unwrap_or_else(|_| Err(BridgeError::TransportUnavailable("approval abandoned".into())))
}
