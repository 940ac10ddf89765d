//! Pending Approval Table - approval-gated calls waiting on the user.
//!
//! Maps correlation ids to the dispatcher branch waiting for a decision.
//!
//! Flow:
//! 1. Dispatcher calls `register()` and keeps the returned receiver
//! 2. Controller reserves a surface and calls `attach_surface()`
//! 3. Surface is presented; controller calls `mark_awaiting()`
//! 4. Decision, surface closure or the sweep calls `resolve()` / `reject()`
//! 5. Dispatcher's receiver yields the single outcome
//!
//! Every terminal transition removes the entry first, then delivers the
//! outcome, then closes the attached surface. A second transition for the
//! same id finds nothing and is a no-op.

use crate::domain::approval::{Approval, ApprovalOutcome, ApprovalState, ApprovalTerminal};
use crate::ports::outbound::SurfaceCloser;
use dashmap::DashMap;
use parking_lot::RwLock;
use shared_types::{ApprovalKind, BridgeError, CorrelationId, Origin, SurfaceId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Default lifetime of a pending approval.
pub const DEFAULT_APPROVAL_TIMEOUT: Duration = Duration::from_secs(300);

/// A pending approval waiting for a decision.
struct PendingApproval {
    /// Channel to the waiting dispatcher branch
    sender: oneshot::Sender<ApprovalOutcome>,
    /// Requesting origin
    origin: Origin,
    /// Connect or sign
    kind: ApprovalKind,
    /// Attached surface, once reserved
    surface: Option<SurfaceId>,
    /// Live state
    state: ApprovalState,
    /// When the approval was registered
    created_at: Instant,
}

/// Statistics for the pending table.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total approvals registered
    pub total_registered: AtomicU64,
    /// Total approved
    pub total_approved: AtomicU64,
    /// Total rejected by the user
    pub total_rejected: AtomicU64,
    /// Total dismissed (surface closed without a decision)
    pub total_dismissed: AtomicU64,
    /// Total swept after the timeout
    pub total_timeouts: AtomicU64,
    /// Total failed for other reasons
    pub total_aborted: AtomicU64,
}

impl PendingStats {
    fn record(&self, terminal: ApprovalTerminal) {
        let counter = match terminal {
            ApprovalTerminal::Approved => &self.total_approved,
            ApprovalTerminal::Rejected => &self.total_rejected,
            ApprovalTerminal::Dismissed => &self.total_dismissed,
            ApprovalTerminal::TimedOut => &self.total_timeouts,
            ApprovalTerminal::Aborted => &self.total_aborted,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Table of outstanding approval-gated calls.
pub struct PendingApprovalTable {
    /// Map of correlation id to pending approval
    pending: DashMap<CorrelationId, PendingApproval>,
    /// Reverse index for surface-closed events
    by_surface: DashMap<SurfaceId, CorrelationId>,
    /// Closes surfaces on terminal transitions
    closer: Arc<dyn SurfaceCloser>,
    /// Entry lifetime
    timeout: Duration,
    /// Statistics
    stats: PendingStats,
    /// Set once the table is closed; new approvals fail with it
    closed: RwLock<Option<BridgeError>>,
}

impl PendingApprovalTable {
    /// Create a table whose entries expire after `timeout`.
    pub fn new(closer: Arc<dyn SurfaceCloser>, timeout: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            by_surface: DashMap::new(),
            closer,
            timeout,
            stats: PendingStats::default(),
            closed: RwLock::new(None),
        }
    }

    /// Register an approval and get the receiver for its outcome.
    ///
    /// The correlation id is fresh (random v4) and never reused. Once the
    /// table is closed the receiver yields the close error straight away and
    /// nothing is stored.
    pub fn register(
        &self,
        origin: Origin,
        kind: ApprovalKind,
    ) -> (CorrelationId, oneshot::Receiver<ApprovalOutcome>) {
        let (tx, rx) = oneshot::channel();
        let mut id = CorrelationId::new();
        while self.pending.contains_key(&id) {
            id = CorrelationId::new();
        }

        if let Some(error) = self.closed_error() {
            debug!(request_id = %id, origin = %origin, "Approval refused, table closed");
            self.stats.record(ApprovalTerminal::from_error(&error));
            let _ = tx.send(Err(error));
            return (id, rx);
        }

        debug!(
            request_id = %id,
            origin = %origin,
            kind = kind.route(),
            "Registered pending approval"
        );

        self.pending.insert(
            id,
            PendingApproval {
                sender: tx,
                origin,
                kind,
                surface: None,
                state: ApprovalState::Opening,
                created_at: Instant::now(),
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        // A close that ran between the check above and the insert missed this entry.
        if let Some(error) = self.closed_error() {
            self.reject(id, error);
        }

        (id, rx)
    }

    /// Attach a reserved surface to a pending approval.
    ///
    /// Returns false if the approval already settled or already has a surface.
    pub fn attach_surface(&self, id: CorrelationId, surface: SurfaceId) -> bool {
        let Some(mut entry) = self.pending.get_mut(&id) else {
            debug!(request_id = %id, surface = %surface, "Attach for settled approval");
            return false;
        };
        if entry.surface.is_some() {
            warn!(request_id = %id, surface = %surface, "Approval already has a surface");
            return false;
        }
        entry.surface = Some(surface);
        drop(entry);

        self.by_surface.insert(surface, id);
        true
    }

    /// Move an approval to `AwaitingDecision` once its surface is showing.
    pub fn mark_awaiting(&self, id: CorrelationId) -> bool {
        match self.pending.get_mut(&id) {
            Some(mut entry) => {
                entry.state = ApprovalState::AwaitingDecision;
                true
            }
            None => false,
        }
    }

    /// Settle an approval as approved.
    ///
    /// Absent ids are a no-op and return false.
    pub fn resolve(&self, id: CorrelationId, approval: Approval) -> bool {
        self.settle(id, Ok(approval))
    }

    /// Settle an approval with an error.
    ///
    /// Absent ids are a no-op and return false.
    pub fn reject(&self, id: CorrelationId, error: BridgeError) -> bool {
        self.settle(id, Err(error))
    }

    fn settle(&self, id: CorrelationId, outcome: ApprovalOutcome) -> bool {
        let Some((_, pending)) = self.pending.remove(&id) else {
            debug!(request_id = %id, "Outcome for unknown or settled approval");
            return false;
        };
        if let Some(surface) = pending.surface {
            self.by_surface.remove(&surface);
        }

        let terminal = match &outcome {
            Ok(_) => ApprovalTerminal::Approved,
            Err(e) => ApprovalTerminal::from_error(e),
        };
        self.stats.record(terminal);

        let elapsed = pending.created_at.elapsed();
        if pending.sender.send(outcome).is_err() {
            // Waiting branch is gone (host shutting down); the entry is still settled.
            warn!(request_id = %id, "Approval receiver dropped");
        } else {
            debug!(
                request_id = %id,
                origin = %pending.origin,
                kind = pending.kind.route(),
                outcome = ?terminal,
                elapsed_ms = elapsed.as_millis() as u64,
                "Settled pending approval"
            );
        }

        if let Some(surface) = pending.surface {
            self.closer.close(surface);
        }
        true
    }

    /// Approval attached to `surface`, if still pending.
    pub fn id_for_surface(&self, surface: SurfaceId) -> Option<CorrelationId> {
        self.by_surface.get(&surface).map(|id| *id)
    }

    /// Reject every entry older than the timeout with `Timeout`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let expired: Vec<CorrelationId> = self
            .pending
            .iter()
            .filter(|entry| now.saturating_duration_since(entry.created_at) > self.timeout)
            .map(|entry| *entry.key())
            .collect();

        let mut removed = 0;
        for id in expired {
            warn!(
                request_id = %id,
                timeout_ms = self.timeout.as_millis() as u64,
                "Pending approval expired"
            );
            if self.reject(id, BridgeError::Timeout("approval not received".into())) {
                removed += 1;
            }
        }
        removed
    }

    /// Close the table (host shutdown): reject every entry with `error` and
    /// refuse later registrations with it. Returns the number rejected.
    pub fn close(&self, error: BridgeError) -> usize {
        *self.closed.write() = Some(error.clone());
        let ids: Vec<CorrelationId> = self.pending.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter(|id| self.reject(*id, error.clone()))
            .count()
    }

    /// Whether `close()` has run.
    pub fn is_closed(&self) -> bool {
        self.closed.read().is_some()
    }

    fn closed_error(&self) -> Option<BridgeError> {
        self.closed.read().clone()
    }

    /// Origin that requested `id`.
    pub fn origin_of(&self, id: &CorrelationId) -> Option<Origin> {
        self.pending.get(id).map(|entry| entry.origin.clone())
    }

    /// Live state of `id`.
    pub fn state(&self, id: &CorrelationId) -> Option<ApprovalState> {
        self.pending.get(id).map(|entry| entry.state)
    }

    /// Check if an approval is pending
    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.pending.contains_key(id)
    }

    /// Number of outstanding approvals
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Entry lifetime
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

/// Background task that sweeps expired approvals.
pub async fn cleanup_task(table: Arc<PendingApprovalTable>, interval: Duration) {
    let mut sweep_interval = tokio::time::interval(interval);
    sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep_interval.tick().await;
        let removed = table.sweep_expired(Instant::now());
        if removed > 0 {
            debug!(removed = removed, "Swept expired pending approvals");
        }
    }
}
