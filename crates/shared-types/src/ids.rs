//! # Identifiers
//!
//! Three id spaces cross the wallet boundaries and they are deliberately
//! distinct types so one can never be passed where another is expected:
//!
//! | Type | Minted by | Purpose |
//! |------|-----------|---------|
//! | [`CallId`] | page provider (untrusted) | matches a page call to its response frame |
//! | [`CorrelationId`] | wallet host (privileged) | keys a pending approval |
//! | [`SurfaceId`] | approval controller | names one approval window |
//!
//! A `CallId` is UUID v7 (time ordered, handy in logs). A `CorrelationId` is
//! UUID v4 so the page cannot predict the host's bookkeeping keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Page-side call identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(Uuid);

impl CallId {
    /// Generate a new call id (UUID v7).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CallId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Host-side pending approval identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new correlation id (UUID v4, unpredictable).
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Approval window handle.
///
/// Allocated synchronously from a process-wide counter so the handle exists
/// before the native window does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(u64);

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

impl SurfaceId {
    /// Reserve the next surface id.
    pub fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_ids_unique() {
        let a = CallId::new();
        let b = CallId::new();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn test_correlation_id_is_random() {
        let id = CorrelationId::new();
        assert_eq!(id.as_uuid().get_version_num(), 4);
        let parsed = CorrelationId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_surface_ids_monotonic() {
        let a = SurfaceId::next();
        let b = SurfaceId::next();
        assert!(b > a);
        assert!(a.to_string().starts_with("surface-"));
    }

    #[test]
    fn test_call_id_serializes_as_string() {
        let id = CallId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
    }
}
