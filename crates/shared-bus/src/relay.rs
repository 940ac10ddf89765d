//! # Content Relay
//!
//! The content script of one tab. It listens for request frames on the page
//! window, forwards each one into the privileged context over the runtime
//! channel, and posts the single reply back tagged with the same call id.
//!
//! ```text
//! page ──RequestFrame──→ [window] ──→ ContentRelay ──RuntimePayload──→ host
//! page ←─ResponseFrame── [window] ←── ContentRelay ←──ResponseEnvelope── host
//! ```
//!
//! The relay, not the page, decides the origin placed on each request.

use crate::runtime::{MessageSender, TransportError};
use crate::window::{WindowChannel, WindowListener};
use shared_types::{
    BridgeError, Origin, OriginError, RequestEnvelope, RequestFrame, ResponseEnvelope,
    ResponseFrame, RuntimePayload, WindowMessage,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Relay statistics.
#[derive(Debug, Default)]
pub struct RelayStats {
    /// Request frames forwarded.
    pub forwarded: AtomicU64,
    /// Responses posted back.
    pub answered: AtomicU64,
    /// Requests that found no listener.
    pub unavailable: AtomicU64,
    /// Requests the host dropped without answering.
    pub dropped: AtomicU64,
}

/// Content script bridging one page window to the wallet host.
pub struct ContentRelay {
    window: WindowChannel,
    port: Arc<dyn MessageSender>,
    origin: Origin,
    stats: RelayStats,
}

impl ContentRelay {
    /// Create a relay for the page at `page_url`.
    pub fn new(
        window: WindowChannel,
        port: Arc<dyn MessageSender>,
        page_url: &str,
    ) -> Result<Self, OriginError> {
        Ok(Self {
            window,
            port,
            origin: Origin::parse(page_url)?,
            stats: RelayStats::default(),
        })
    }

    /// Origin stamped on forwarded requests.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Statistics.
    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    /// Start relaying.
    ///
    /// The window listener is installed before this returns, so frames
    /// posted right after `spawn` are not missed.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        let listener = self.window.listen();
        tokio::spawn(self.run(listener))
    }

    async fn run(self: Arc<Self>, mut listener: WindowListener) {
        while let Some(message) = listener.recv().await {
            match message {
                WindowMessage::Request(frame) => {
                    let relay = Arc::clone(&self);
                    tokio::spawn(async move { relay.forward(frame).await });
                }
                // Our own replies, or another script's traffic.
                WindowMessage::Response(_) => {}
            }
        }
        debug!(origin = %self.origin, "Window closed, content relay stopped");
    }

    async fn forward(&self, frame: RequestFrame) {
        let call_id = frame.id;
        let payload = RuntimePayload::PageRequest {
            call_id,
            request: RequestEnvelope::new(frame.method, frame.params, self.origin.clone()),
        };
        self.stats.forwarded.fetch_add(1, Ordering::Relaxed);

        let response = match self.port.send_message(payload).await {
            Ok(response) => response,
            Err(TransportError::NoListener) => {
                self.stats.unavailable.fetch_add(1, Ordering::Relaxed);
                warn!(call_id = %call_id, "Wallet host unreachable");
                ResponseEnvelope::failure(BridgeError::TransportUnavailable(
                    TransportError::NoListener.to_string(),
                ))
            }
            Err(TransportError::ReplyDropped) => {
                // The host refused the message; the page's own timeout settles the call.
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(call_id = %call_id, "Wallet host dropped request without reply");
                return;
            }
        };

        self.stats.answered.fetch_add(1, Ordering::Relaxed);
        self.window.post(WindowMessage::Response(ResponseFrame {
            id: call_id,
            response,
        }));
    }
}
