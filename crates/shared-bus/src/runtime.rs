//! # Runtime Message Channel
//!
//! Models `runtime.sendMessage` into the privileged context: each message
//! carries the sender identity stamped by the transport and a one-shot reply
//! slot. A message can be answered at most once because answering consumes
//! the [`Responder`].

use async_trait::async_trait;
use shared_types::{ResponseEnvelope, RuntimePayload, SenderContext};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Transport failures seen by the sending side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Nobody is listening in the privileged context.
    #[error("could not establish connection: receiving end does not exist")]
    NoListener,

    /// The listener dropped the message without answering.
    #[error("message port closed before a response was received")]
    ReplyDropped,
}

/// Reply slot for one runtime message.
#[derive(Debug)]
pub struct Responder(oneshot::Sender<ResponseEnvelope>);

impl Responder {
    /// Send the reply. Returns false if the sender stopped waiting.
    pub fn send(self, response: ResponseEnvelope) -> bool {
        self.0.send(response).is_ok()
    }
}

/// One message as delivered to the privileged context.
#[derive(Debug)]
pub struct RuntimeEnvelope {
    /// Identity stamped by the transport; `None` for unattributed senders.
    pub sender: Option<SenderContext>,
    /// Message payload.
    pub payload: RuntimePayload,
    /// Reply slot.
    pub responder: Responder,
}

/// Sending side of the runtime channel.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send a payload and wait for the single reply.
    async fn send_message(&self, payload: RuntimePayload) -> Result<ResponseEnvelope, TransportError>;
}

/// Create a runtime channel.
///
/// The returned port stamps no identity; use [`RuntimePort::for_sender`] to
/// obtain a port bound to a content script or extension page.
pub fn runtime_channel(capacity: usize) -> (RuntimePort, RuntimeListener) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        RuntimePort { tx, sender: None },
        RuntimeListener { rx },
    )
}

/// A handle for sending into the privileged context.
#[derive(Clone)]
pub struct RuntimePort {
    tx: mpsc::Sender<RuntimeEnvelope>,
    sender: Option<SenderContext>,
}

impl RuntimePort {
    /// A port that stamps `sender` on every message.
    #[must_use]
    pub fn for_sender(&self, sender: SenderContext) -> Self {
        Self {
            tx: self.tx.clone(),
            sender: Some(sender),
        }
    }

    /// Identity this port stamps.
    pub fn sender(&self) -> Option<&SenderContext> {
        self.sender.as_ref()
    }

    /// Whether the listener is gone.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl MessageSender for RuntimePort {
    async fn send_message(&self, payload: RuntimePayload) -> Result<ResponseEnvelope, TransportError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let envelope = RuntimeEnvelope {
            sender: self.sender.clone(),
            payload,
            responder: Responder(reply_tx),
        };

        self.tx
            .send(envelope)
            .await
            .map_err(|_| TransportError::NoListener)?;

        debug!("Runtime message sent, awaiting reply");
        reply_rx.await.map_err(|_| TransportError::ReplyDropped)
    }
}

/// Receiving side of the runtime channel, owned by the wallet host.
pub struct RuntimeListener {
    rx: mpsc::Receiver<RuntimeEnvelope>,
}

impl RuntimeListener {
    /// Receive the next message; `None` once every port is dropped.
    pub async fn recv(&mut self) -> Option<RuntimeEnvelope> {
        self.rx.recv().await
    }

    /// Stop accepting messages; queued messages can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
