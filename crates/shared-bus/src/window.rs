//! # Page Window Channel
//!
//! Models `window.postMessage` on a page: every listener sees every message,
//! including messages posted by unrelated scripts. Listeners must filter by
//! message type and by the call ids they own.

use crate::DEFAULT_CHANNEL_CAPACITY;
use shared_types::WindowMessage;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Broadcast channel shared by everything running on one page.
///
/// Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct WindowChannel {
    /// Broadcast sender for window messages.
    sender: broadcast::Sender<WindowMessage>,

    /// Total messages posted.
    posted: Arc<AtomicU64>,

    /// Channel capacity.
    capacity: usize,
}

impl WindowChannel {
    /// Create a window channel with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a window channel with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            posted: Arc::new(AtomicU64::new(0)),
            capacity,
        }
    }

    /// Post a message to every current listener.
    ///
    /// Returns the number of listeners that received it. Messages posted with
    /// no listener are lost, as on a real page.
    pub fn post(&self, message: WindowMessage) -> usize {
        self.posted.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(message) {
            Ok(listeners) => {
                debug!(listeners, "Window message posted");
                listeners
            }
            Err(_) => {
                warn!("Window message dropped (no listeners)");
                0
            }
        }
    }

    /// Start listening. Only messages posted after this call are seen.
    #[must_use]
    pub fn listen(&self) -> WindowListener {
        WindowListener {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of active listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Total messages posted.
    #[must_use]
    pub fn messages_posted(&self) -> u64 {
        self.posted.load(Ordering::Relaxed)
    }

    /// Channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for WindowChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// A listener on the window channel.
pub struct WindowListener {
    receiver: broadcast::Receiver<WindowMessage>,
}

impl WindowListener {
    /// Receive the next message.
    ///
    /// Returns `None` once every `WindowChannel` handle is dropped. A lagging
    /// listener skips the overwritten messages and keeps going.
    pub async fn recv(&mut self) -> Option<WindowMessage> {
        loop {
            match self.receiver.recv().await {
                Ok(message) => return Some(message),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(lagged = count, "Window listener lagged, messages dropped");
                }
            }
        }
    }
}
