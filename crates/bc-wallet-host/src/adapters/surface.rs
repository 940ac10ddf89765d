//! Channel-backed surface host.
//!
//! Each presented surface is emitted on a channel so a driver (a terminal
//! prompt, an automated approver, a test) can render it and decide.
//! `close()` plays the role of the window going away, whether the user
//! closed it or the wallet did.

use crate::domain::approval::SurfaceSpec;
use crate::domain::error::CollaboratorError;
use crate::ports::outbound::{CollaboratorResult, SurfaceCloser, SurfaceHost};
use crate::surface::SurfaceWatch;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared_types::SurfaceId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::debug;

/// A surface handed to the driver.
#[derive(Debug, Clone)]
pub struct PresentedSurface {
    pub surface: SurfaceId,
    pub spec: SurfaceSpec,
}

/// Surface host that forwards presented surfaces over a channel.
pub struct ChannelSurfaceHost {
    presented: mpsc::UnboundedSender<PresentedSurface>,
    open: DashMap<SurfaceId, SurfaceWatch>,
    /// Reserved but not yet presented; true once closed
    opening: Mutex<HashMap<SurfaceId, bool>>,
    failing: AtomicBool,
}

impl ChannelSurfaceHost {
    /// Create a host and the receiver its driver reads.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresentedSurface>) {
        let (presented, rx) = mpsc::unbounded_channel();
        (
            Self {
                presented,
                open: DashMap::new(),
                opening: Mutex::new(HashMap::new()),
                failing: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// Make subsequent presentations fail (window creation refused).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Whether `surface` is showing.
    pub fn is_open(&self, surface: SurfaceId) -> bool {
        self.open.contains_key(&surface)
    }

    /// Number of open surfaces.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }

    /// Number of reserved surfaces still waiting to be presented.
    pub fn opening_count(&self) -> usize {
        self.opening.lock().len()
    }
}

impl SurfaceCloser for ChannelSurfaceHost {
    fn close(&self, surface: SurfaceId) {
        // Held across both lookups so a concurrent present cannot slip between them.
        let mut opening = self.opening.lock();
        if let Some((_, watch)) = self.open.remove(&surface) {
            debug!(surface = %surface, "Surface closed");
            watch.closed();
        } else if let Some(closed) = opening.get_mut(&surface) {
            *closed = true;
        }
    }
}

#[async_trait]
impl SurfaceHost for ChannelSurfaceHost {
    fn reserve(&self, surface: SurfaceId) {
        self.opening.lock().insert(surface, false);
    }

    async fn present(
        &self,
        surface: SurfaceId,
        spec: SurfaceSpec,
        watch: SurfaceWatch,
    ) -> CollaboratorResult<()> {
        let mut opening = self.opening.lock();
        let closed = opening.remove(&surface).unwrap_or(false);
        if self.failing.load(Ordering::Relaxed) {
            return Err(CollaboratorError::Unavailable("window creation refused".into()));
        }
        if closed {
            // Settled while opening; report the closure and show nothing.
            watch.closed();
            return Ok(());
        }

        self.open.insert(surface, watch);
        drop(opening);
        if self
            .presented
            .send(PresentedSurface { surface, spec })
            .is_err()
        {
            debug!(surface = %surface, "No surface driver attached");
        }
        Ok(())
    }
}
