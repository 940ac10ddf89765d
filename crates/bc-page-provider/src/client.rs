//! # Provider Client
//!
//! Outbound shim running in the page. Each call gets a fresh [`CallId`], a
//! local resolver, and a request frame posted on the window. The response
//! frame carrying the same id settles the call; frames for ids this client
//! does not own (other scripts, late replies) are dropped.
//!
//! The window listener is installed when the client is created, before any
//! request can be posted.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_bus::{WindowChannel, WindowListener};
use shared_types::{BridgeError, BridgeResult, CallId, RequestFrame, ResponseEnvelope, WindowMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type Resolvers = DashMap<CallId, oneshot::Sender<ResponseEnvelope>>;

/// Page-side configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Upper bound on one call. Longer than the wallet's approval timeout so
    /// the wallet normally answers first.
    pub call_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            call_timeout_ms: 330_000,
        }
    }
}

impl ProviderConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// Client statistics.
#[derive(Debug, Default)]
pub struct ClientStats {
    /// Calls issued
    pub sent: AtomicU64,
    /// Calls settled by a response
    pub settled: AtomicU64,
    /// Calls that hit the local timeout
    pub timed_out: AtomicU64,
    /// Response frames with no matching call
    pub unmatched: AtomicU64,
}

/// Page-side correlation of calls and response frames.
pub struct ProviderClient {
    window: WindowChannel,
    resolvers: Arc<Resolvers>,
    call_timeout: Duration,
    stats: Arc<ClientStats>,
    router: JoinHandle<()>,
}

impl ProviderClient {
    /// Attach a client to `window`. Must be called within a tokio runtime.
    pub fn new(window: WindowChannel, config: &ProviderConfig) -> Self {
        let resolvers: Arc<Resolvers> = Arc::new(DashMap::new());
        let stats = Arc::new(ClientStats::default());
        let listener = window.listen();
        let router = tokio::spawn(route_responses(
            listener,
            Arc::clone(&resolvers),
            Arc::clone(&stats),
        ));

        Self {
            window,
            resolvers,
            call_timeout: config.call_timeout(),
            stats,
            router,
        }
    }

    /// Call `method` and wait for its single result.
    pub async fn send(&self, method: &str, params: Value) -> BridgeResult<Value> {
        let id = CallId::new();
        let (tx, rx) = oneshot::channel();
        self.resolvers.insert(id, tx);
        self.stats.sent.fetch_add(1, Ordering::Relaxed);

        debug!(call_id = %id, method = method, "Posting request");
        self.window.post(WindowMessage::Request(RequestFrame {
            id,
            method: method.to_string(),
            params,
        }));

        match tokio::time::timeout(self.call_timeout, rx).await {
            Ok(Ok(response)) => response.into_result(),
            Ok(Err(_)) => Err(BridgeError::TransportUnavailable(
                "provider detached".into(),
            )),
            Err(_) => {
                self.resolvers.remove(&id);
                self.stats.timed_out.fetch_add(1, Ordering::Relaxed);
                warn!(call_id = %id, method = method, "Call timed out");
                Err(BridgeError::Timeout(format!("{method} did not complete")))
            }
        }
    }

    /// Calls waiting for a response.
    pub fn in_flight(&self) -> usize {
        self.resolvers.len()
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }
}

impl Drop for ProviderClient {
    fn drop(&mut self) {
        self.router.abort();
    }
}

async fn route_responses(mut listener: WindowListener, resolvers: Arc<Resolvers>, stats: Arc<ClientStats>) {
    while let Some(message) = listener.recv().await {
        let WindowMessage::Response(frame) = message else {
            continue;
        };
        match resolvers.remove(&frame.id) {
            Some((_, resolver)) => {
                stats.settled.fetch_add(1, Ordering::Relaxed);
                // The caller may have timed out in between; nothing to do then.
                let _ = resolver.send(frame.response);
            }
            None => {
                stats.unmatched.fetch_add(1, Ordering::Relaxed);
                debug!(call_id = %frame.id, "Response for unknown call dropped");
            }
        }
    }
}
