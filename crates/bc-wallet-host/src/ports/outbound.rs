//! Outbound ports for the wallet host.
//!
//! The host only knows its collaborators as async operations that return a
//! value or fail. Adapters live in [`crate::adapters`].

use crate::domain::approval::SurfaceSpec;
use crate::domain::error::CollaboratorError;
use crate::surface::SurfaceWatch;
use async_trait::async_trait;
use shared_types::{
    Account, RetrievedContent, StorageNode, StoreRequest, StoredContent, SurfaceId,
};

/// Result type for collaborator calls.
pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Account store.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// All accounts, in insertion order.
    async fn list(&self) -> CollaboratorResult<Vec<Account>>;

    /// The current account.
    async fn current(&self) -> CollaboratorResult<Account>;

    /// Make `id` the current account.
    async fn set_current(&self, id: &str) -> CollaboratorResult<()>;

    /// Create an account named `name` and make it current.
    async fn add(&self, name: &str) -> CollaboratorResult<Account>;

    /// Replace the stored record with the same id.
    async fn update(&self, account: Account) -> CollaboratorResult<()>;

    /// Delete `id`. Returns false if it did not exist.
    async fn remove(&self, id: &str) -> CollaboratorResult<bool>;
}

/// Registry of storage endpoints and the current selection.
#[async_trait]
pub trait NodeRegistry: Send + Sync {
    /// Configured nodes.
    async fn nodes(&self) -> CollaboratorResult<Vec<StorageNode>>;

    /// Replace the node list.
    async fn save_nodes(&self, nodes: Vec<StorageNode>) -> CollaboratorResult<()>;

    /// Id of the selected node.
    async fn selected_id(&self) -> CollaboratorResult<String>;

    /// Select a node by id without checking that it exists.
    async fn set_selected_id(&self, id: &str) -> CollaboratorResult<()>;
}

/// Content-addressed storage.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store content; returns its id and size.
    async fn store(&self, request: StoreRequest) -> CollaboratorResult<StoredContent>;

    /// Fetch content by id.
    async fn retrieve(&self, cid: &str) -> CollaboratorResult<RetrievedContent>;

    /// Probe a node. `Ok(true)` when it answered.
    async fn test_connection(&self, node: &StorageNode) -> CollaboratorResult<bool>;
}

/// Message signer.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Sign `message` with `account`, returning the encoded signature.
    async fn sign(&self, account: &Account, message: &str) -> CollaboratorResult<String>;
}

/// Closes approval surfaces.
///
/// Closing an unknown or already-closed surface is a no-op.
pub trait SurfaceCloser: Send + Sync {
    fn close(&self, surface: SurfaceId);
}

/// Presents approval surfaces.
///
/// Implementations must report every closure of a presented surface through
/// the supplied [`SurfaceWatch`], whether the user closed it or
/// [`SurfaceCloser::close`] did.
#[async_trait]
pub trait SurfaceHost: SurfaceCloser {
    /// Announce a surface that is about to be presented, so a close that
    /// arrives first is remembered. Hosts that present synchronously can
    /// ignore it.
    fn reserve(&self, _surface: SurfaceId) {}

    async fn present(
        &self,
        surface: SurfaceId,
        spec: SurfaceSpec,
        watch: SurfaceWatch,
    ) -> CollaboratorResult<()>;
}
