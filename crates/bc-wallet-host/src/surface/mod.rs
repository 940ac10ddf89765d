//! Approval surfaces.
//!
//! A surface reports its own closure through a [`SurfaceWatch`] handed to
//! the host when it is presented. The watch exists before presentation, so a
//! window that closes while it is still opening is never missed.

pub mod controller;

pub use controller::{ApprovalController, OpenedApproval};

use crate::ports::outbound::{SurfaceCloser, SurfaceHost};
use shared_types::SurfaceId;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Lets the pending table close surfaces through a shared surface host.
pub struct HostCloser(pub Arc<dyn SurfaceHost>);

impl SurfaceCloser for HostCloser {
    fn close(&self, surface: SurfaceId) {
        self.0.close(surface);
    }
}

/// Events reported by surface hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The surface is gone, for any reason.
    Closed(SurfaceId),
}

/// Close subscription for one surface.
#[derive(Debug, Clone)]
pub struct SurfaceWatch {
    surface: SurfaceId,
    events: mpsc::UnboundedSender<SurfaceEvent>,
}

impl SurfaceWatch {
    pub(crate) fn new(surface: SurfaceId, events: mpsc::UnboundedSender<SurfaceEvent>) -> Self {
        Self { surface, events }
    }

    /// Surface this watch belongs to.
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Report that the surface closed. Returns false once the controller stopped.
    pub fn closed(&self) -> bool {
        self.events.send(SurfaceEvent::Closed(self.surface)).is_ok()
    }
}
