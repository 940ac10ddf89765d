//! # Transport Behaviour
//!
//! The window is shared by every script on the page and the runtime
//! channel may have nobody listening. These tests check that each page call
//! still settles exactly once, with the right value or a typed error.

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use bc_page_provider::{BcExtension, ProviderConfig};
    use serde_json::json;
    use shared_bus::{runtime_channel, ContentRelay, WindowChannel};
    use shared_types::{
        BridgeError, CallId, RequestFrame, ResponseEnvelope, ResponseFrame, SenderContext,
        WindowMessage,
    };
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    fn short_timeout() -> ProviderConfig {
        ProviderConfig {
            call_timeout_ms: 200,
        }
    }

    #[tokio::test]
    async fn test_stray_frames_do_not_settle_calls() {
        let mut h = Harness::start();
        let (window, page) = h.open_tab_with(1, "https://dapp.example", &ProviderConfig::default());
        h.connect(&page).await;

        // Another script answers an id nobody asked for.
        window.post(WindowMessage::Response(ResponseFrame {
            id: CallId::new(),
            response: ResponseEnvelope::failure(BridgeError::UserRejected),
        }));

        assert!(page.get_accounts().await.is_ok());
        assert!(page.client().stats().unmatched.load(Ordering::Relaxed) >= 1);
        assert_eq!(page.client().in_flight(), 0);
    }

    #[tokio::test]
    async fn test_two_providers_on_one_window() {
        let mut h = Harness::start();
        let (window, page) = h.open_tab_with(1, "https://dapp.example", &ProviderConfig::default());
        let second = BcExtension::inject(window, &ProviderConfig::default());
        h.connect(&page).await;

        let (nodes, accounts) = tokio::join!(second.list_nodes(), page.get_accounts());
        assert!(!nodes.unwrap().is_empty());
        assert!(!accounts.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_response_frame_echoes_call_id() {
        let mut h = Harness::start();
        let (window, _page) = h.open_tab_with(1, "https://dapp.example", &ProviderConfig::default());
        let mut listener = window.listen();

        let id = CallId::new();
        window.post(WindowMessage::Request(RequestFrame {
            id,
            method: "getAccounts".into(),
            params: json!({}),
        }));

        let frame = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(WindowMessage::Response(frame)) = listener.recv().await {
                    return frame;
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(frame.id, id);
        assert_eq!(frame.response.into_result(), Err(BridgeError::NotConnected));
    }

    #[tokio::test]
    async fn test_missing_host_is_transport_unavailable() {
        let (port, listener) = runtime_channel(4);
        drop(listener);
        let tab = port.for_sender(SenderContext::content_script(
            "bc-wallet",
            1,
            "https://dapp.example",
        ));

        let window = WindowChannel::new();
        let relay = ContentRelay::new(window.clone(), Arc::new(tab), "https://dapp.example").unwrap();
        let _relay = Arc::new(relay).spawn();
        let page = BcExtension::inject(window, &ProviderConfig::default());

        assert!(matches!(
            page.connect().await,
            Err(BridgeError::TransportUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_refused_message_settles_by_page_timeout() {
        let h = Harness::start();
        // A content script from another extension: the host drops it unanswered.
        let foreign = h.host.port().for_sender(SenderContext::content_script(
            "not-our-extension",
            1,
            "https://dapp.example",
        ));

        let window = WindowChannel::new();
        let relay = Arc::new(
            ContentRelay::new(window.clone(), Arc::new(foreign), "https://dapp.example").unwrap(),
        );
        let _task = Arc::clone(&relay).spawn();
        let page = BcExtension::inject(window, &short_timeout());

        assert!(matches!(page.get_accounts().await, Err(BridgeError::Timeout(_))));
        assert_eq!(relay.stats().dropped.load(Ordering::Relaxed), 1);
        assert_eq!(page.client().in_flight(), 0);
        assert_eq!(
            h.host.inbound().stats().untrusted_sender.load(Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_page_timeout_leaves_host_consistent() {
        let mut h = Harness::start();
        let (_window, page) = h.open_tab_with(1, "https://dapp.example", &short_timeout());

        // Nobody answers the window; the page gives up first.
        let (connected, shown) = tokio::join!(page.connect(), h.next_surface());
        assert!(matches!(connected, Err(BridgeError::Timeout(_))));
        assert!(h.host.pending().is_pending(&shown.spec.request_id));

        // The late decision still settles the host side once.
        h.decide(&shown, true).await;
        assert!(!h.host.pending().is_pending(&shown.spec.request_id));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(h.host.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_params() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        assert_eq!(
            page.request("eth_sendTransaction", json!({})).await,
            Err(BridgeError::UnsupportedMethod("eth_sendTransaction".into()))
        );
        assert!(matches!(
            page.request("signMessage", json!({})).await,
            Err(BridgeError::InvalidParams(_))
        ));
        assert!(matches!(
            page.request("ipfs_get", json!({ "cid": "" })).await,
            Err(BridgeError::InvalidParams(_))
        ));
    }
}
