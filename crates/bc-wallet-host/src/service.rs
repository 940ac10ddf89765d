//! Wallet host service - owns and wires the privileged context.
//!
//! One `WalletHost` owns one capability registry and one pending table;
//! nothing is global. `start()` spawns three tasks:
//! - inbound relay (drains the runtime channel)
//! - surface event loop (turns closures into dismissals)
//! - approval sweep (rejects stale approvals with `Timeout`)

use crate::adapters::{
    ChannelSurfaceHost, DigestSigner, InMemoryAccountStore, InMemoryNodeRegistry,
    PresentedSurface, SimulatedContentStore,
};
use crate::dispatcher::{Collaborators, Dispatcher};
use crate::domain::capability::CapabilityRegistry;
use crate::domain::config::HostConfig;
use crate::domain::error::HostError;
use crate::domain::pending::{cleanup_task, PendingApprovalTable};
use crate::ipc::InboundRelay;
use crate::ports::outbound::SurfaceHost;
use crate::surface::{ApprovalController, HostCloser, SurfaceEvent};
use shared_bus::{runtime_channel, RuntimeListener, RuntimePort};
use shared_types::{BridgeError, SenderContext};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

/// The privileged wallet context.
pub struct WalletHost {
    config: HostConfig,
    registry: Arc<CapabilityRegistry>,
    table: Arc<PendingApprovalTable>,
    controller: Arc<ApprovalController>,
    dispatcher: Arc<Dispatcher>,
    inbound: Arc<InboundRelay>,
    port: RuntimePort,
    listener: Option<RuntimeListener>,
    surface_events: Option<mpsc::UnboundedReceiver<SurfaceEvent>>,
    tasks: Vec<JoinHandle<()>>,
}

impl WalletHost {
    /// Create a host over the given collaborators and surface host.
    pub fn new(
        config: HostConfig,
        collaborators: Collaborators,
        surfaces: Arc<dyn SurfaceHost>,
    ) -> Result<Self, HostError> {
        config.validate()?;

        let registry = Arc::new(CapabilityRegistry::new());
        let table = Arc::new(PendingApprovalTable::new(
            Arc::new(HostCloser(Arc::clone(&surfaces))),
            config.approvals.timeout,
        ));
        let (controller, surface_events) =
            ApprovalController::new(Arc::clone(&table), surfaces, config.surface.clone());
        let controller = Arc::new(controller);
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            Arc::clone(&controller),
            collaborators,
            config.collaborators.timeout,
        ));
        let inbound = Arc::new(InboundRelay::new(
            Arc::clone(&dispatcher),
            config.trust.extension_id.clone(),
            config.relay.replay_window,
        ));
        let (port, listener) = runtime_channel(config.relay.runtime_capacity);

        Ok(Self {
            config,
            registry,
            table,
            controller,
            dispatcher,
            inbound,
            port,
            listener: Some(listener),
            surface_events: Some(surface_events),
            tasks: Vec::new(),
        })
    }

    /// Host backed by the in-memory adapters.
    ///
    /// Returns the receiver on which approval surfaces are presented.
    pub fn in_memory(
        config: HostConfig,
    ) -> Result<(Self, mpsc::UnboundedReceiver<PresentedSurface>), HostError> {
        let collaborators = Collaborators {
            accounts: Arc::new(InMemoryAccountStore::new()),
            nodes: Arc::new(InMemoryNodeRegistry::new()),
            content: Arc::new(SimulatedContentStore::from_config(&config.storage)),
            signer: Arc::new(DigestSigner::new()),
        };
        let (surfaces, presented) = ChannelSurfaceHost::new();
        let host = Self::new(config, collaborators, Arc::new(surfaces))?;
        Ok((host, presented))
    }

    /// Spawn the host tasks. Must be called within a tokio runtime.
    pub fn start(&mut self) -> Result<(), HostError> {
        let (Some(listener), Some(events)) = (self.listener.take(), self.surface_events.take())
        else {
            return Err(HostError::AlreadyRunning);
        };

        info!(
            extension_id = %self.config.trust.extension_id,
            approval_timeout_s = self.config.approvals.timeout.as_secs(),
            "Starting wallet host..."
        );

        self.tasks.push(Arc::clone(&self.inbound).spawn(listener));
        self.tasks
            .push(tokio::spawn(Arc::clone(&self.controller).run(events)));
        self.tasks.push(tokio::spawn(cleanup_task(
            Arc::clone(&self.table),
            self.config.approvals.sweep_interval,
        )));

        info!("Wallet host started");
        Ok(())
    }

    /// Stop the host tasks and reject every pending approval.
    ///
    /// Returns the number of approvals rejected.
    pub fn shutdown(&mut self) -> usize {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        // Closing also fails approvals that in-flight calls register later.
        let rejected = self
            .table
            .close(BridgeError::TransportUnavailable("wallet host stopped".into()));
        info!(rejected = rejected, "Wallet host stopped");
        rejected
    }

    /// Whether `start()` has run and `shutdown()` has not.
    pub fn is_running(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Port stamped as the content script of tab `tab_id` showing `url`.
    pub fn content_port(&self, tab_id: u32, url: &str) -> RuntimePort {
        self.port.for_sender(SenderContext::content_script(
            self.config.trust.extension_id.clone(),
            tab_id,
            url,
        ))
    }

    /// Port stamped as a wallet extension page (popup, approval window).
    pub fn extension_port(&self) -> RuntimePort {
        self.port
            .for_sender(SenderContext::extension_page(self.config.trust.extension_id.clone()))
    }

    /// Raw port; stamps whatever identity the caller supplies via `for_sender`.
    pub fn port(&self) -> RuntimePort {
        self.port.clone()
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<CapabilityRegistry> {
        &self.registry
    }

    pub fn pending(&self) -> &Arc<PendingApprovalTable> {
        &self.table
    }

    pub fn controller(&self) -> &Arc<ApprovalController> {
        &self.controller
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn inbound(&self) -> &Arc<InboundRelay> {
        &self.inbound
    }
}

impl Drop for WalletHost {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
