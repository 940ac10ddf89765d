//! Capability Registry - origins that hold a connection grant.
//!
//! Grants live for the lifetime of one wallet host; nothing is persisted.

use parking_lot::RwLock;
use shared_types::Origin;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// In-memory set of connected origins.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    granted: RwLock<BTreeSet<Origin>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `origin` holds a grant.
    pub fn is_granted(&self, origin: &Origin) -> bool {
        self.granted.read().contains(origin)
    }

    /// Grant `origin`. Idempotent; returns true if the grant is new.
    pub fn grant(&self, origin: Origin) -> bool {
        let inserted = self.granted.write().insert(origin.clone());
        if inserted {
            info!(origin = %origin, "Origin connected");
        } else {
            debug!(origin = %origin, "Origin already connected");
        }
        inserted
    }

    /// Drop the grant for `origin`. Returns true if one existed.
    pub fn revoke(&self, origin: &Origin) -> bool {
        let removed = self.granted.write().remove(origin);
        if removed {
            info!(origin = %origin, "Origin disconnected");
        }
        removed
    }

    /// Granted origins, sorted.
    pub fn list(&self) -> Vec<Origin> {
        self.granted.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.granted.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.granted.read().is_empty()
    }
}
