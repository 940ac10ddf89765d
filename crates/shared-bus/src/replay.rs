//! # Time-Bounded Replay Guard
//!
//! Remembers page call ids seen by the inbound relay so one call id can
//! never start two dispatches.
//!
//! ## Design
//!
//! - Ids are remembered for a validity window (default 10 minutes, longer
//!   than any approval may stay open).
//! - Expired ids are garbage-collected lazily on insert, which bounds memory.

use shared_types::CallId;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors from replay checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The call id was already seen inside the window.
    #[error("call id {id} has already been used")]
    Replayed { id: CallId },
}

/// Time-bounded set of seen call ids.
pub struct ReplayGuard {
    /// Call id → when first seen.
    seen: HashMap<CallId, Instant>,

    /// How long an id stays remembered.
    window: Duration,

    /// Last garbage collection.
    last_gc: Instant,

    /// Garbage collection interval.
    gc_interval: Duration,
}

impl ReplayGuard {
    /// Default validity window.
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(600);

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10);

    /// Create a guard with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Self::DEFAULT_WINDOW, Self::DEFAULT_GC_INTERVAL)
    }

    /// Create a guard with custom settings.
    #[must_use]
    pub fn with_config(window: Duration, gc_interval: Duration) -> Self {
        Self {
            seen: HashMap::new(),
            window,
            last_gc: Instant::now(),
            gc_interval,
        }
    }

    /// Record `id`, failing if it was already recorded inside the window.
    pub fn check_and_record(&mut self, id: CallId) -> Result<(), ReplayError> {
        let now = Instant::now();

        if now.duration_since(self.last_gc) > self.gc_interval {
            self.garbage_collect(now);
            self.last_gc = now;
        }

        if let Some(first_seen) = self.seen.get(&id) {
            if now.duration_since(*first_seen) <= self.window {
                return Err(ReplayError::Replayed { id });
            }
        }

        self.seen.insert(id, now);
        Ok(())
    }

    /// Check if an id is remembered without recording it.
    #[must_use]
    pub fn contains(&self, id: &CallId) -> bool {
        self.seen.contains_key(id)
    }

    /// Number of remembered ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no ids are remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn garbage_collect(&mut self, now: Instant) {
        let window = self.window;
        self.seen.retain(|_, first_seen| now.duration_since(*first_seen) <= window);
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new()
    }
}
