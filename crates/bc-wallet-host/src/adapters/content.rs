//! Simulated content-addressed store.
//!
//! Keeps the most recent `capacity` uploads in memory. Content ids are
//! `Qm` followed by the hex of the first 22 bytes of the SHA-256 of the
//! content, so identical content always maps to the same id.

use crate::domain::config::StorageConfig;
use crate::domain::error::CollaboratorError;
use crate::ports::outbound::{CollaboratorResult, ContentStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use shared_types::{RetrievedContent, StorageNode, StoreRequest, StoredContent};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tracing::debug;

const CID_PREFIX: &str = "Qm";
const CID_DIGEST_BYTES: usize = 22;
const DEFAULT_NAME: &str = "unnamed";
const DEFAULT_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone)]
struct CachedContent {
    content: String,
    name: String,
    mime_type: String,
}

#[derive(Default)]
struct Cache {
    entries: HashMap<String, CachedContent>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

/// In-memory stand-in for a content-addressed network.
pub struct SimulatedContentStore {
    cache: Mutex<Cache>,
    capacity: usize,
    latency: Duration,
    unreachable: HashSet<String>,
}

impl SimulatedContentStore {
    /// Store keeping at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(Cache::default()),
            capacity: capacity.max(1),
            latency: Duration::ZERO,
            unreachable: HashSet::new(),
        }
    }

    /// Store built from configuration.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            latency: config.latency,
            unreachable: config.unreachable_nodes.iter().cloned().collect(),
            ..Self::new(config.cache_capacity)
        }
    }

    /// Mark a node id as failing its connection test.
    #[must_use]
    pub fn with_unreachable(mut self, node_id: impl Into<String>) -> Self {
        self.unreachable.insert(node_id.into());
        self
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// Content id for `content`.
pub fn content_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    format!("{}{}", CID_PREFIX, hex::encode(&digest[..CID_DIGEST_BYTES]))
}

#[async_trait]
impl ContentStore for SimulatedContentStore {
    async fn store(&self, request: StoreRequest) -> CollaboratorResult<StoredContent> {
        if request.content.is_empty() {
            return Err(CollaboratorError::Invalid("content is required".into()));
        }
        self.simulate_latency().await;

        let size = request.effective_size();
        let cid = content_id(&request.content);
        let entry = CachedContent {
            content: request.content,
            name: request.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            mime_type: request.mime_type.unwrap_or_else(|| DEFAULT_MIME.to_string()),
        };

        let mut cache = self.cache.lock();
        if cache.entries.insert(cid.clone(), entry).is_none() {
            cache.order.push_back(cid.clone());
        }
        while cache.entries.len() > self.capacity {
            let Some(oldest) = cache.order.pop_front() else {
                break;
            };
            cache.entries.remove(&oldest);
            debug!(cid = %oldest, "Evicted cached content");
        }

        debug!(cid = %cid, size = size, "Stored content");
        Ok(StoredContent { cid, size })
    }

    async fn retrieve(&self, cid: &str) -> CollaboratorResult<RetrievedContent> {
        self.simulate_latency().await;

        if let Some(entry) = self.cache.lock().entries.get(cid) {
            return Ok(RetrievedContent {
                content: entry.content.clone(),
                name: entry.name.clone(),
                mime_type: entry.mime_type.clone(),
            });
        }

        // Well-formed but unknown ids resolve to placeholder content.
        if cid.starts_with(CID_PREFIX) {
            Ok(RetrievedContent {
                content: format!("IPFS content: {cid}"),
                name: "ipfs-file.txt".into(),
                mime_type: "text/plain".into(),
            })
        } else {
            Err(CollaboratorError::Invalid("invalid cid".into()))
        }
    }

    async fn test_connection(&self, node: &StorageNode) -> CollaboratorResult<bool> {
        self.simulate_latency().await;
        if self.unreachable.contains(&node.id) {
            return Err(CollaboratorError::Unavailable(
                "connection timed out or failed".into(),
            ));
        }
        Ok(true)
    }
}
