//! In-memory storage node registry.

use crate::domain::error::CollaboratorError;
use crate::ports::outbound::{CollaboratorResult, NodeRegistry};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{default_nodes, StorageNode, DEFAULT_NODE_ID};
use tracing::debug;

/// Node list plus the selected node id.
pub struct InMemoryNodeRegistry {
    nodes: RwLock<Vec<StorageNode>>,
    selected: RwLock<String>,
}

impl InMemoryNodeRegistry {
    /// Registry with the built-in node list.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(default_nodes()),
            selected: RwLock::new(DEFAULT_NODE_ID.to_string()),
        }
    }
}

impl Default for InMemoryNodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeRegistry for InMemoryNodeRegistry {
    async fn nodes(&self) -> CollaboratorResult<Vec<StorageNode>> {
        Ok(self.nodes.read().clone())
    }

    async fn save_nodes(&self, nodes: Vec<StorageNode>) -> CollaboratorResult<()> {
        if nodes.is_empty() {
            return Err(CollaboratorError::Invalid("node list cannot be empty".into()));
        }
        debug!(count = nodes.len(), "Node list saved");
        *self.nodes.write() = nodes;
        Ok(())
    }

    async fn selected_id(&self) -> CollaboratorResult<String> {
        Ok(self.selected.read().clone())
    }

    async fn set_selected_id(&self, id: &str) -> CollaboratorResult<()> {
        if id.is_empty() {
            return Err(CollaboratorError::Invalid("node id cannot be empty".into()));
        }
        *self.selected.write() = id.to_string();
        Ok(())
    }
}
