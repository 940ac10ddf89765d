//! # Core Domain Entities
//!
//! Wallet-facing records exchanged between the page, the wallet host and
//! its collaborators. Field names serialize in camelCase because pages
//! consume them as plain JSON.

use serde::{Deserialize, Serialize};

// =============================================================================
// ACCOUNTS
// =============================================================================

/// A wallet account as exposed to connected pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable account id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// `0x`-prefixed hex address.
    pub address: String,
    /// Optional avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Account {
    /// Create an account without an icon.
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            icon: None,
        }
    }
}

/// Accounts seeded into an empty store.
pub fn default_accounts() -> Vec<Account> {
    vec![
        Account::new("1", "Account 1", "0x742d35Cc6634C0532925a3b844Bc454e4438f44e"),
        Account::new("2", "Account 2", "0xD69B8ff1D98451A3bedA461C07bf8D5fb0e29e14"),
    ]
}

// =============================================================================
// STORAGE NODES
// =============================================================================

/// A content-addressed storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageNode {
    /// Node id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Endpoint URL.
    pub url: String,
}

impl StorageNode {
    /// Create a node record.
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Id of the node selected when nothing has been chosen yet.
pub const DEFAULT_NODE_ID: &str = "1";

/// Built-in node list.
pub fn default_nodes() -> Vec<StorageNode> {
    vec![
        StorageNode::new("1", "Infura IPFS", "https://ipfs.infura.io:5001"),
        StorageNode::new("2", "Cloudflare IPFS", "https://cloudflare-ipfs.com"),
        StorageNode::new("3", "Pinata", "https://api.pinata.cloud"),
        StorageNode::new("4", "Local Node", "http://localhost:5001"),
    ]
}

// =============================================================================
// CONTENT
// =============================================================================

/// Content handed to the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    /// Content body (base64 for binary uploads).
    pub content: String,
    /// File name.
    #[serde(default)]
    pub name: Option<String>,
    /// MIME type.
    #[serde(default, rename = "type")]
    pub mime_type: Option<String>,
    /// Declared size; defaults to the content length.
    #[serde(default)]
    pub size: Option<u64>,
}

impl StoreRequest {
    /// Plain content with no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            name: None,
            mime_type: None,
            size: None,
        }
    }

    /// Effective size.
    pub fn effective_size(&self) -> u64 {
        self.size.unwrap_or(self.content.len() as u64)
    }
}

/// Receipt for stored content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredContent {
    /// Content id.
    pub cid: String,
    /// Size in bytes.
    pub size: u64,
}

/// Content fetched by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievedContent {
    /// Content body.
    pub content: String,
    /// File name.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
}

// =============================================================================
// APPROVALS
// =============================================================================

/// Operations that require explicit user consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    /// Origin wants read access to accounts.
    Connect,
    /// Origin wants a message signed.
    Sign,
}

impl ApprovalKind {
    /// Route fragment used by the approval UI.
    pub fn route(&self) -> &'static str {
        match self {
            ApprovalKind::Connect => "connect",
            ApprovalKind::Sign => "sign",
        }
    }
}
