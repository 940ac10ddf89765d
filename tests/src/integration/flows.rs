//! # Approval Flows
//!
//! ```text
//! page.connect() ──→ relay ──→ host ──present──→ approval window
//!                                                     │ decision
//! page ←──{success: true}── relay ←── host ←──────────┘
//! ```
//!
//! ## Test Categories
//!
//! 1. **Happy Path**: connect, list accounts, sign
//! 2. **Grant Gating**: ungranted origins never reach an approval window
//! 3. **User Exits**: deny, dismiss, approval timeout, host shutdown
//! 4. **Concurrency**: approvals decided out of order

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use bc_wallet_host::ports::outbound::SurfaceCloser;
    use bc_wallet_host::HostConfig;
    use serde_json::json;
    use shared_bus::MessageSender;
    use shared_types::{
        ApprovalKind, BridgeError, InternalRequest, Origin, RuntimePayload, StoreRequest,
    };
    use std::time::Duration;

    // =========================================================================
    // HAPPY PATH
    // =========================================================================

    #[tokio::test]
    async fn test_connect_accounts_then_denied_signature() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example/index.html");

        h.connect(&page).await;
        assert!(h
            .host
            .registry()
            .is_granted(&Origin::parse("https://dapp.example").unwrap()));

        let accounts = page.get_accounts().await.unwrap();
        assert!(!accounts.is_empty());

        let (signed, ()) = tokio::join!(page.sign_message("hello"), async {
            let shown = h.next_surface().await;
            assert_eq!(shown.spec.kind, ApprovalKind::Sign);
            assert_eq!(shown.spec.message.as_deref(), Some("hello"));
            h.decide(&shown, false).await;
        });
        assert_eq!(signed, Err(BridgeError::UserRejected));
        assert_eq!(h.host.pending().pending_count(), 0);
        assert_eq!(h.surfaces.open_count(), 0);
    }

    #[tokio::test]
    async fn test_approved_signature_without_payload_uses_current_account() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        let (signed, ()) = tokio::join!(page.sign_message("hello"), async {
            let shown = h.next_surface().await;
            h.decide(&shown, true).await;
        });
        let signature = signed.unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 64);
    }

    #[tokio::test]
    async fn test_storage_round_trip_after_connect() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        let stored = page
            .store(StoreRequest {
                name: Some("notes.txt".into()),
                mime_type: Some("text/plain".into()),
                ..StoreRequest::new("remember the milk")
            })
            .await
            .unwrap();
        assert!(stored.cid.starts_with("Qm"));
        assert_eq!(stored.size, "remember the milk".len() as u64);

        let content = page.retrieve(&stored.cid).await.unwrap();
        assert_eq!(content.content, "remember the milk");
        assert_eq!(content.name, "notes.txt");

        let node = page.switch_node("2").await.unwrap();
        assert_eq!(page.get_current_node().await.unwrap(), Some(node));
    }

    #[tokio::test]
    async fn test_unreachable_node_reports_failure() {
        let mut config = HostConfig::default();
        config.storage.unreachable_nodes = vec!["4".into()];
        let mut h = Harness::with_config(config);
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        assert!(page.test_node_connection("1").await.is_ok());
        assert!(matches!(
            page.test_node_connection("4").await,
            Err(BridgeError::CollaboratorFailure(_))
        ));
        assert!(matches!(
            page.test_node_connection("99").await,
            Err(BridgeError::NotFound(_))
        ));
    }

    // =========================================================================
    // GRANT GATING
    // =========================================================================

    #[tokio::test]
    async fn test_grant_does_not_leak_to_other_origins() {
        let mut h = Harness::start();
        let granted = h.open_tab(1, "https://dapp.example");
        let other = h.open_tab(2, "https://other.example");
        h.connect(&granted).await;

        assert_eq!(other.get_accounts().await, Err(BridgeError::NotConnected));
        assert_eq!(other.sign_message("x").await, Err(BridgeError::NotConnected));
        // Storage methods carry no grant check.
        assert!(other.list_nodes().await.is_ok());

        // Refused before any window was opened.
        assert!(h.presented.try_recv().is_err());
        assert_eq!(h.host.pending().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_same_origin_in_two_tabs_shares_the_grant() {
        let mut h = Harness::start();
        let first = h.open_tab(1, "https://dapp.example/a");
        let second = h.open_tab(2, "https://dapp.example:443/b");
        h.connect(&first).await;

        assert!(second.get_accounts().await.is_ok());
    }

    #[tokio::test]
    async fn test_revoked_origin_must_reconnect() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        let revoked = h
            .host
            .extension_port()
            .send_message(RuntimePayload::Internal(InternalRequest::RevokeSite {
                origin: Origin::parse("https://dapp.example").unwrap(),
            }))
            .await
            .unwrap();
        assert_eq!(revoked.into_result().unwrap()["revoked"], json!(true));
        assert_eq!(page.get_accounts().await, Err(BridgeError::NotConnected));
    }

    #[tokio::test]
    async fn test_denied_connect_grants_nothing() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");

        let (connected, ()) = tokio::join!(page.connect(), async {
            let shown = h.next_surface().await;
            h.decide(&shown, false).await;
        });
        assert_eq!(connected, Err(BridgeError::UserRejected));
        assert!(h.host.registry().is_empty());
    }

    // =========================================================================
    // USER EXITS
    // =========================================================================

    #[tokio::test]
    async fn test_closing_the_window_dismisses() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");

        let (connected, ()) = tokio::join!(page.connect(), async {
            let shown = h.next_surface().await;
            assert!(h.surfaces.is_open(shown.surface));
            h.surfaces.close(shown.surface);
        });
        assert_eq!(connected, Err(BridgeError::UserDismissed));
        assert_eq!(h.host.pending().pending_count(), 0);
        assert!(h.host.registry().is_empty());
    }

    #[tokio::test]
    async fn test_decision_after_dismissal_is_ignored() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");

        let (connected, shown) = tokio::join!(page.connect(), async {
            let shown = h.next_surface().await;
            h.surfaces.close(shown.surface);
            shown
        });
        assert_eq!(connected, Err(BridgeError::UserDismissed));

        // A late approval from the closed window changes nothing.
        h.decide(&shown, true).await;
        assert!(h.host.registry().is_empty());
    }

    #[tokio::test]
    async fn test_unanswered_approval_times_out() {
        let mut config = HostConfig::default();
        config.approvals.timeout = Duration::from_millis(100);
        config.approvals.sweep_interval = Duration::from_millis(20);
        let mut h = Harness::with_config(config);
        let page = h.open_tab(1, "https://dapp.example");

        let (connected, shown) = tokio::join!(page.connect(), h.next_surface());
        assert!(matches!(connected, Err(BridgeError::Timeout(_))));
        assert!(!h.surfaces.is_open(shown.surface));
        assert_eq!(h.host.pending().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_rejects_open_approvals() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");

        let (connected, ()) = tokio::join!(page.connect(), async {
            h.next_surface().await;
            assert_eq!(h.host.shutdown(), 1);
        });
        assert!(matches!(connected, Err(BridgeError::TransportUnavailable(_))));
        assert!(!h.host.is_running());
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[tokio::test]
    async fn test_concurrent_signatures_decided_out_of_order() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        let (first, second, ()) = tokio::join!(
            page.sign_message("first"),
            page.sign_message("second"),
            async {
                let a = h.next_surface().await;
                let b = h.next_surface().await;
                assert_ne!(a.spec.request_id, b.spec.request_id);
                assert_ne!(a.surface, b.surface);
                let (first, second) = if a.spec.message.as_deref() == Some("first") {
                    (a, b)
                } else {
                    (b, a)
                };
                h.sign_with(&second, "0xsecond").await;
                h.decide(&first, false).await;
            }
        );

        assert_eq!(first, Err(BridgeError::UserRejected));
        assert_eq!(second, Ok("0xsecond".to_string()));
        assert_eq!(h.host.pending().pending_count(), 0);
    }

    #[tokio::test]
    async fn test_pending_approval_does_not_block_other_calls() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        let other = h.open_tab(2, "https://other.example");
        h.connect(&page).await;

        let (signed, ()) = tokio::join!(page.sign_message("slow"), async {
            let shown = h.next_surface().await;
            // Served while the signature waits on the user.
            assert!(page.get_accounts().await.is_ok());
            assert_eq!(other.get_accounts().await, Err(BridgeError::NotConnected));
            h.decide(&shown, false).await;
        });
        assert_eq!(signed, Err(BridgeError::UserRejected));
    }
}
