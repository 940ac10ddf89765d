//! # Wallet Wiring
//!
//! Assembles the three contexts of one browser profile:
//!
//! ```text
//! BcExtension ─window─→ ContentRelay (tab N) ─runtime─→ WalletHost
//!                                                          │ present
//!                                    approver ←────────────┘
//!                                        └──decision (extension page)──→ WalletHost
//! ```

use crate::approver::{self, Policy};
use crate::config::RuntimeConfig;
use anyhow::Result;
use bc_page_provider::{BcExtension, ProviderConfig};
use bc_wallet_host::adapters::{
    DigestSigner, InMemoryAccountStore, InMemoryNodeRegistry, SimulatedContentStore,
};
use bc_wallet_host::{ChannelSurfaceHost, Collaborators, WalletHost};
use shared_bus::{ContentRelay, WindowChannel};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// A running wallet host with its approval driver and open tabs.
pub struct Wallet {
    host: WalletHost,
    surfaces: Arc<ChannelSurfaceHost>,
    provider: ProviderConfig,
    driver: JoinHandle<()>,
    relays: Vec<JoinHandle<()>>,
}

impl Wallet {
    /// Start the host and the approval driver. Must be called within a
    /// tokio runtime.
    pub fn start(config: &RuntimeConfig, policy: Policy) -> Result<Self> {
        let collaborators = Collaborators {
            accounts: Arc::new(InMemoryAccountStore::new()),
            nodes: Arc::new(InMemoryNodeRegistry::new()),
            content: Arc::new(SimulatedContentStore::from_config(&config.host.storage)),
            signer: Arc::new(DigestSigner::new()),
        };
        let (surfaces, presented) = ChannelSurfaceHost::new();
        let surfaces = Arc::new(surfaces);

        let mut host = WalletHost::new(config.host.clone(), collaborators, surfaces.clone())?;
        host.start()?;

        let driver = tokio::spawn(approver::drive(
            presented,
            Arc::clone(&surfaces),
            host.extension_port(),
            policy,
        ));

        Ok(Self {
            host,
            surfaces,
            provider: config.provider.clone(),
            driver,
            relays: Vec::new(),
        })
    }

    /// Load `url` in tab `tab_id`: a fresh window, its content relay, and
    /// the injected page API.
    pub fn open_tab(&mut self, tab_id: u32, url: &str) -> Result<BcExtension> {
        let window = WindowChannel::new();
        let relay = ContentRelay::new(
            window.clone(),
            Arc::new(self.host.content_port(tab_id, url)),
            url,
        )?;
        info!(tab_id = tab_id, origin = %relay.origin(), "Tab opened");
        self.relays.push(Arc::new(relay).spawn());
        Ok(BcExtension::inject(window, &self.provider))
    }

    pub fn host(&self) -> &WalletHost {
        &self.host
    }

    pub fn surfaces(&self) -> &Arc<ChannelSurfaceHost> {
        &self.surfaces
    }

    /// Stop everything. Returns the number of approvals cut short.
    pub fn shutdown(mut self) -> usize {
        for relay in self.relays.drain(..) {
            relay.abort();
        }
        self.driver.abort();
        self.host.shutdown()
    }
}
