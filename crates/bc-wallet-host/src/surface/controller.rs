//! # Approval Surface Controller
//!
//! Opens Connect and Sign surfaces and routes decisions and closures back to
//! the pending table.
//!
//! ```text
//! open() ─register─→ table ─reserve SurfaceId─→ attach ─spawn─→ host.present()
//!                                                                  │
//! DecisionMessage ──handle_decision()──→ table.resolve/reject       │
//! SurfaceEvent::Closed ──handle_closed()──→ table.reject(UserDismissed)
//! ```
//!
//! The surface id is reserved and attached before anything is presented, so
//! the close subscription always exists before the window does.

use crate::domain::approval::{Approval, ApprovalOutcome, SurfaceSpec};
use crate::domain::config::SurfaceConfig;
use crate::domain::pending::PendingApprovalTable;
use crate::ports::outbound::SurfaceHost;
use crate::surface::{SurfaceEvent, SurfaceWatch};
use shared_types::{ApprovalKind, BridgeError, CorrelationId, DecisionMessage, Origin, SurfaceId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Handle to an approval that has been opened.
#[derive(Debug)]
pub struct OpenedApproval {
    /// Pending table id, carried by the surface route
    pub request_id: CorrelationId,
    /// Reserved surface
    pub surface: SurfaceId,
    /// Single outcome of the approval
    pub outcome: oneshot::Receiver<ApprovalOutcome>,
}

/// Opens approval surfaces and correlates their decisions.
pub struct ApprovalController {
    table: Arc<PendingApprovalTable>,
    host: Arc<dyn SurfaceHost>,
    geometry: SurfaceConfig,
    events: mpsc::UnboundedSender<SurfaceEvent>,
}

impl ApprovalController {
    /// Create a controller and the receiver its event loop drains.
    pub fn new(
        table: Arc<PendingApprovalTable>,
        host: Arc<dyn SurfaceHost>,
        geometry: SurfaceConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SurfaceEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                table,
                host,
                geometry,
                events,
            },
            rx,
        )
    }

    /// Register an approval and open its surface.
    ///
    /// The surface id is reserved synchronously; the native surface is
    /// presented on a spawned task. Must be called within a tokio runtime.
    pub fn open(&self, kind: ApprovalKind, origin: Origin, message: Option<String>) -> OpenedApproval {
        let (request_id, outcome) = self.table.register(origin.clone(), kind);
        let surface = SurfaceId::next();
        let watch = SurfaceWatch::new(surface, self.events.clone());
        // Reserved before attaching, so a settlement racing this call closes it.
        self.host.reserve(surface);
        if !self.table.attach_surface(request_id, surface) {
            // Settled already; nothing will close the surface for us.
            self.host.close(surface);
        }

        let spec = SurfaceSpec {
            request_id,
            kind,
            origin,
            message,
            width: self.geometry.width,
            height: self.geometry.height,
        };

        debug!(
            request_id = %request_id,
            surface = %surface,
            route = %spec.route(),
            "Opening approval surface"
        );

        let table = Arc::clone(&self.table);
        let host = Arc::clone(&self.host);
        tokio::spawn(async move {
            match host.present(surface, spec, watch).await {
                Ok(()) => {
                    if !table.mark_awaiting(request_id) {
                        debug!(request_id = %request_id, "Approval settled while surface was opening");
                    }
                }
                Err(e) => {
                    warn!(request_id = %request_id, surface = %surface, error = %e, "Approval surface failed to open");
                    table.reject(
                        request_id,
                        BridgeError::CollaboratorFailure(format!("approval window failed to open: {e}")),
                    );
                }
            }
        });

        OpenedApproval {
            request_id,
            surface,
            outcome,
        }
    }

    /// Apply a decision from an approval surface.
    ///
    /// Decisions for settled ids, or naming a different origin than the
    /// pending approval, are dropped. Returns true if the decision settled
    /// an approval.
    pub fn handle_decision(&self, decision: &DecisionMessage) -> bool {
        let id = decision.request_id;
        let Some(pending_origin) = self.table.origin_of(&id) else {
            debug!(request_id = %id, "Decision for unknown or settled approval dropped");
            return false;
        };

        if let Some(claimed) = &decision.origin {
            if *claimed != pending_origin {
                warn!(
                    request_id = %id,
                    expected = %pending_origin,
                    claimed = %claimed,
                    "Decision origin mismatch, dropped"
                );
                return false;
            }
        }

        if decision.approved {
            self.table.resolve(
                id,
                Approval {
                    payload: decision.payload.clone(),
                },
            )
        } else {
            self.table.reject(id, BridgeError::UserRejected)
        }
    }

    /// A surface closed. Synthesizes `UserDismissed` if it was still pending.
    pub fn handle_closed(&self, surface: SurfaceId) -> bool {
        match self.table.id_for_surface(surface) {
            Some(id) => {
                debug!(request_id = %id, surface = %surface, "Surface closed before decision");
                self.table.reject(id, BridgeError::UserDismissed)
            }
            None => false,
        }
    }

    /// Drain surface events until every watch and the controller are gone.
    ///
    /// The loop holds the controller weakly, so it does not keep its own
    /// event sender alive.
    pub async fn run(self: Arc<Self>, mut events: mpsc::UnboundedReceiver<SurfaceEvent>) {
        let controller = Arc::downgrade(&self);
        drop(self);

        while let Some(event) = events.recv().await {
            let Some(controller) = controller.upgrade() else {
                break;
            };
            match event {
                SurfaceEvent::Closed(surface) => {
                    controller.handle_closed(surface);
                }
            }
        }
        debug!("Surface event loop stopped");
    }

    /// Pending table this controller drives.
    pub fn table(&self) -> &Arc<PendingApprovalTable> {
        &self.table
    }
}
