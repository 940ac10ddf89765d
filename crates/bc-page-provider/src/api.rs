//! Typed page API (`window.bcExtension`).
//!
//! Thin wrappers over [`ProviderClient::send`] that build params and decode
//! results into shared entity types.

use crate::client::{ProviderClient, ProviderConfig};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared_bus::WindowChannel;
use shared_types::{
    Account, BridgeError, BridgeResult, RetrievedContent, StorageNode, StoreRequest, StoredContent,
};

/// The wallet API exposed to a page.
pub struct BcExtension {
    client: ProviderClient,
}

impl BcExtension {
    /// Inject the API into the page owning `window`.
    pub fn inject(window: WindowChannel, config: &ProviderConfig) -> Self {
        Self {
            client: ProviderClient::new(window, config),
        }
    }

    /// Ask the user to connect this origin. Resolves once they decide.
    pub async fn connect(&self) -> BridgeResult<bool> {
        let result = self.client.send("connect", json!({})).await?;
        field(result, "success")
    }

    /// Accounts visible to this origin. Requires a connection.
    pub async fn get_accounts(&self) -> BridgeResult<Vec<Account>> {
        let result = self.client.send("getAccounts", json!({})).await?;
        field(result, "accounts")
    }

    /// Ask the user to sign `message`. Requires a connection.
    pub async fn sign_message(&self, message: &str) -> BridgeResult<String> {
        let result = self
            .client
            .send("signMessage", json!({ "message": message }))
            .await?;
        field(result, "signature")
    }

    pub async fn get_current_node(&self) -> BridgeResult<Option<StorageNode>> {
        let result = self.client.send("ipfs_getCurrentNode", json!({})).await?;
        field(result, "currentNode")
    }

    pub async fn list_nodes(&self) -> BridgeResult<Vec<StorageNode>> {
        let result = self.client.send("ipfs_getNodes", json!({})).await?;
        field(result, "nodes")
    }

    pub async fn switch_node(&self, node_id: &str) -> BridgeResult<StorageNode> {
        let result = self
            .client
            .send("ipfs_switchNode", json!({ "nodeId": node_id }))
            .await?;
        field(result, "node")
    }

    /// Upload content.
    pub async fn store(&self, request: StoreRequest) -> BridgeResult<StoredContent> {
        let params = serde_json::to_value(&request)
            .map_err(|e| BridgeError::InvalidParams(e.to_string()))?;
        let result = self.client.send("ipfs_add", params).await?;
        decode(result)
    }

    /// Download content by id.
    pub async fn retrieve(&self, cid: &str) -> BridgeResult<RetrievedContent> {
        let result = self.client.send("ipfs_get", json!({ "cid": cid })).await?;
        decode(result)
    }

    /// Probe a storage node. Resolves to the node when it answered.
    pub async fn test_node_connection(&self, node_id: &str) -> BridgeResult<StorageNode> {
        let result = self
            .client
            .send("ipfs_testConnection", json!({ "nodeId": node_id }))
            .await?;
        field(result, "node")
    }

    /// Untyped call, for methods without a wrapper.
    pub async fn request(&self, method: &str, params: Value) -> BridgeResult<Value> {
        self.client.send(method, params).await
    }

    pub fn client(&self) -> &ProviderClient {
        &self.client
    }
}

fn field<T: DeserializeOwned>(mut result: Value, key: &str) -> BridgeResult<T> {
    let value = result.get_mut(key).map(Value::take).unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| BridgeError::TransportUnavailable(format!("malformed `{key}` in response: {e}")))
}

fn decode<T: DeserializeOwned>(result: Value) -> BridgeResult<T> {
    serde_json::from_value(result)
        .map_err(|e| BridgeError::TransportUnavailable(format!("malformed response: {e}")))
}
