//! # Inbound Relay
//!
//! Privileged end of the runtime channel. Every message is checked before
//! anything is dispatched:
//!
//! 1. The transport must have stamped a sender with our extension id.
//! 2. Page requests must come from a tab, and the envelope origin must equal
//!    the origin of that tab's URL.
//! 3. A page call id is dispatched at most once (replay guard).
//! 4. Internal messages must come from an extension page, never a tab.
//!
//! Messages failing a check are dropped without a reply; the sending side
//! observes the dropped reply and the page's own timeout settles the call.
//! Accepted messages are handled on their own task so a slow approval never
//! blocks other callers.

use crate::dispatcher::Dispatcher;
use crate::ipc::internal::InternalHandler;
use parking_lot::Mutex;
use shared_bus::{ReplayGuard, RuntimeEnvelope, RuntimeListener};
use shared_types::{Origin, RuntimePayload, SenderContext};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Inbound relay statistics.
#[derive(Debug, Default)]
pub struct InboundStats {
    /// Messages received
    pub received: AtomicU64,
    /// Page requests dispatched
    pub dispatched: AtomicU64,
    /// Internal messages handled
    pub internal: AtomicU64,
    /// Dropped: sender missing or not ours
    pub untrusted_sender: AtomicU64,
    /// Dropped: envelope origin differs from the sender tab
    pub origin_mismatch: AtomicU64,
    /// Dropped: call id already dispatched
    pub replayed: AtomicU64,
}

/// Verifies runtime messages and routes them to the dispatcher.
pub struct InboundRelay {
    dispatcher: Arc<Dispatcher>,
    internal: InternalHandler,
    extension_id: String,
    replay: Mutex<ReplayGuard>,
    stats: InboundStats,
}

impl InboundRelay {
    pub fn new(dispatcher: Arc<Dispatcher>, extension_id: impl Into<String>, replay_window: Duration) -> Self {
        Self {
            internal: InternalHandler::new(Arc::clone(&dispatcher)),
            dispatcher,
            extension_id: extension_id.into(),
            replay: Mutex::new(ReplayGuard::with_config(
                replay_window,
                ReplayGuard::DEFAULT_GC_INTERVAL,
            )),
            stats: InboundStats::default(),
        }
    }

    /// Start draining `listener`.
    pub fn spawn(self: Arc<Self>, listener: RuntimeListener) -> JoinHandle<()> {
        tokio::spawn(self.run(listener))
    }

    async fn run(self: Arc<Self>, mut listener: RuntimeListener) {
        while let Some(envelope) = listener.recv().await {
            let relay = Arc::clone(&self);
            tokio::spawn(async move { relay.handle(envelope).await });
        }
        debug!("Runtime channel closed, inbound relay stopped");
    }

    /// Verify and answer one runtime message.
    pub async fn handle(&self, envelope: RuntimeEnvelope) {
        self.stats.received.fetch_add(1, Ordering::Relaxed);
        let RuntimeEnvelope {
            sender,
            payload,
            responder,
        } = envelope;

        let Some(sender) = self.verify_sender(sender) else {
            self.stats.untrusted_sender.fetch_add(1, Ordering::Relaxed);
            return;
        };

        let response = match payload {
            RuntimePayload::PageRequest { call_id, request } => {
                let Some(tab) = sender.tab else {
                    warn!(call_id = %call_id, "Page request from a non-tab sender dropped");
                    self.stats.untrusted_sender.fetch_add(1, Ordering::Relaxed);
                    return;
                };
                match Origin::parse(&tab.url) {
                    Ok(tab_origin) if tab_origin == request.origin => {}
                    Ok(tab_origin) => {
                        warn!(
                            call_id = %call_id,
                            tab = tab.id,
                            tab_origin = %tab_origin,
                            claimed = %request.origin,
                            "Origin mismatch, request dropped"
                        );
                        self.stats.origin_mismatch.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                    Err(e) => {
                        warn!(call_id = %call_id, tab = tab.id, error = %e, "Sender tab has no usable origin");
                        self.stats.origin_mismatch.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                }

                if let Err(e) = self.replay.lock().check_and_record(call_id) {
                    warn!(error = %e, "Replayed call id dropped");
                    self.stats.replayed.fetch_add(1, Ordering::Relaxed);
                    return;
                }

                debug!(call_id = %call_id, origin = %request.origin, method = %request.method, "Dispatching page request");
                self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
                self.dispatcher.dispatch(request).await
            }
            RuntimePayload::Internal(message) => {
                if sender.tab.is_some() {
                    warn!(message = message.name(), "Internal message from a content script dropped");
                    self.stats.untrusted_sender.fetch_add(1, Ordering::Relaxed);
                    return;
                }
                self.stats.internal.fetch_add(1, Ordering::Relaxed);
                self.internal.handle(message).await
            }
        };

        if !responder.send(response) {
            debug!("Sender stopped waiting before the response was ready");
        }
    }

    fn verify_sender(&self, sender: Option<SenderContext>) -> Option<SenderContext> {
        match sender {
            Some(sender) if sender.extension_id == self.extension_id => Some(sender),
            Some(sender) => {
                warn!(extension_id = %sender.extension_id, "Message from foreign extension dropped");
                None
            }
            None => {
                warn!("Unattributed runtime message dropped");
                None
            }
        }
    }

    pub fn stats(&self) -> &InboundStats {
        &self.stats
    }
}
