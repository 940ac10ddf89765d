//! Shared test fixtures.

use bc_page_provider::{BcExtension, ProviderConfig};
use bc_wallet_host::adapters::{
    DigestSigner, InMemoryAccountStore, InMemoryNodeRegistry, SimulatedContentStore,
};
use bc_wallet_host::{ChannelSurfaceHost, Collaborators, HostConfig, PresentedSurface, WalletHost};
use shared_bus::{ContentRelay, MessageSender, WindowChannel};
use shared_types::{
    ApprovalKind, InternalRequest, Origin, ResponseEnvelope, RuntimePayload,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// How long a test waits for an approval window before failing.
pub const SURFACE_WAIT: Duration = Duration::from_secs(5);

/// A started wallet host with direct access to its approval windows.
pub struct Harness {
    pub host: WalletHost,
    pub surfaces: Arc<ChannelSurfaceHost>,
    pub presented: mpsc::UnboundedReceiver<PresentedSurface>,
    relays: Vec<JoinHandle<()>>,
}

impl Harness {
    pub fn start() -> Self {
        Self::with_config(HostConfig::default())
    }

    pub fn with_config(config: HostConfig) -> Self {
        let collaborators = Collaborators {
            accounts: Arc::new(InMemoryAccountStore::new()),
            nodes: Arc::new(InMemoryNodeRegistry::new()),
            content: Arc::new(SimulatedContentStore::from_config(&config.storage)),
            signer: Arc::new(DigestSigner::new()),
        };
        let (surfaces, presented) = ChannelSurfaceHost::new();
        let surfaces = Arc::new(surfaces);
        let mut host = WalletHost::new(config, collaborators, surfaces.clone())
            .expect("valid config");
        host.start().expect("host starts");
        Self {
            host,
            surfaces,
            presented,
            relays: Vec::new(),
        }
    }

    /// Open `url` in `tab_id` with the default provider config.
    pub fn open_tab(&mut self, tab_id: u32, url: &str) -> BcExtension {
        self.open_tab_with(tab_id, url, &ProviderConfig::default()).1
    }

    /// Open a tab, returning its window as well.
    pub fn open_tab_with(
        &mut self,
        tab_id: u32,
        url: &str,
        provider: &ProviderConfig,
    ) -> (WindowChannel, BcExtension) {
        let window = WindowChannel::new();
        let relay = ContentRelay::new(
            window.clone(),
            Arc::new(self.host.content_port(tab_id, url)),
            url,
        )
        .expect("valid page url");
        self.relays.push(Arc::new(relay).spawn());
        let api = BcExtension::inject(window.clone(), provider);
        (window, api)
    }

    /// Wait for the next approval window.
    pub async fn next_surface(&mut self) -> PresentedSurface {
        tokio::time::timeout(SURFACE_WAIT, self.presented.recv())
            .await
            .expect("approval window presented in time")
            .expect("surface host alive")
    }

    /// Answer a window the way the approval page does.
    pub async fn decide(&self, shown: &PresentedSurface, approved: bool) -> ResponseEnvelope {
        self.send_decision(shown, approved, None, Some(shown.spec.origin.clone()))
            .await
    }

    /// Answer a sign window with an explicit signature.
    pub async fn sign_with(&self, shown: &PresentedSurface, signature: &str) -> ResponseEnvelope {
        self.send_decision(shown, true, Some(signature.to_string()), None)
            .await
    }

    /// Answer a window with full control over the decision fields.
    pub async fn send_decision(
        &self,
        shown: &PresentedSurface,
        approved: bool,
        signature: Option<String>,
        origin: Option<Origin>,
    ) -> ResponseEnvelope {
        let spec = &shown.spec;
        let message = match spec.kind {
            ApprovalKind::Connect => InternalRequest::ConnectionResponse {
                request_id: spec.request_id,
                approved,
                origin,
            },
            ApprovalKind::Sign => InternalRequest::SignatureResponse {
                request_id: spec.request_id,
                approved,
                signature,
            },
        };
        self.host
            .extension_port()
            .send_message(RuntimePayload::Internal(message))
            .await
            .expect("extension page is trusted")
    }

    /// Connect `page`, approving its window.
    pub async fn connect(&mut self, page: &BcExtension) {
        let (connected, ()) = tokio::join!(page.connect(), async {
            let shown = self.next_surface().await;
            assert_eq!(shown.spec.kind, ApprovalKind::Connect);
            self.decide(&shown, true).await;
        });
        assert_eq!(connected, Ok(true));
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        for relay in &self.relays {
            relay.abort();
        }
    }
}
