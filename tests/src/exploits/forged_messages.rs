//! # Forged Messages
//!
//! A page controls what it posts on the window; a compromised content script
//! controls the payload it sends on the runtime channel. Neither controls
//! the sender identity stamped by the transport.
//!
//! | Attack | Expected |
//! |--------|----------|
//! | Envelope origin differs from the sender tab | dropped, no reply |
//! | Call id replayed | dropped, no reply |
//! | Approval decision sent from a tab | dropped, approval still pending |
//! | Decision naming another origin | ignored, approval still pending |
//! | Second decision after the first | ignored |
//! | Foreign extension id | dropped, no reply |

#[cfg(test)]
mod tests {
    use crate::fixtures::Harness;
    use serde_json::json;
    use shared_bus::{MessageSender, TransportError};
    use shared_types::{
        BridgeError, CallId, InternalRequest, Origin, RequestEnvelope, RuntimePayload,
        SenderContext,
    };
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn page_call(call_id: CallId, method: &str, origin: &str) -> RuntimePayload {
        RuntimePayload::PageRequest {
            call_id,
            request: RequestEnvelope::new(method, json!({}), Origin::parse(origin).unwrap()),
        }
    }

    #[tokio::test]
    async fn test_borrowed_origin_is_dropped() {
        let mut h = Harness::start();
        let victim = h.open_tab(1, "https://dapp.example");
        h.connect(&victim).await;

        // Content script in an attacker tab claims the victim's origin.
        let evil = h.host.content_port(9, "https://evil.example/");
        let result = evil
            .send_message(page_call(CallId::new(), "getAccounts", "https://dapp.example"))
            .await;

        assert_eq!(result, Err(TransportError::ReplyDropped));
        assert_eq!(
            h.host.inbound().stats().origin_mismatch.load(Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_replayed_call_id_is_dropped() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        let tab = h.host.content_port(1, "https://dapp.example");
        let id = CallId::new();
        let first = tab
            .send_message(page_call(id, "getAccounts", "https://dapp.example"))
            .await
            .unwrap();
        assert!(first.is_success());

        let replay = tab
            .send_message(page_call(id, "getAccounts", "https://dapp.example"))
            .await;
        assert_eq!(replay, Err(TransportError::ReplyDropped));
        assert_eq!(h.host.inbound().stats().replayed.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_tab_cannot_approve_its_own_request() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");

        let (connected, ()) = tokio::join!(page.connect(), async {
            let shown = h.next_surface().await;
            let forged = h
                .host
                .content_port(1, "https://dapp.example")
                .send_message(RuntimePayload::Internal(InternalRequest::ConnectionResponse {
                    request_id: shown.spec.request_id,
                    approved: true,
                    origin: None,
                }))
                .await;
            assert_eq!(forged, Err(TransportError::ReplyDropped));
            assert!(h.host.pending().is_pending(&shown.spec.request_id));
            assert!(h.host.registry().is_empty());

            h.decide(&shown, false).await;
        });
        assert_eq!(connected, Err(BridgeError::UserRejected));
    }

    #[tokio::test]
    async fn test_decision_for_another_origin_is_ignored() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");

        let (connected, ()) = tokio::join!(page.connect(), async {
            let shown = h.next_surface().await;
            let other = Origin::parse("https://evil.example").unwrap();
            h.send_decision(&shown, true, None, Some(other.clone())).await;
            assert!(h.host.pending().is_pending(&shown.spec.request_id));
            assert!(!h.host.registry().is_granted(&other));

            h.decide(&shown, true).await;
        });
        assert_eq!(connected, Ok(true));
        assert_eq!(h.host.registry().list(), vec![Origin::parse("https://dapp.example").unwrap()]);
    }

    #[tokio::test]
    async fn test_second_decision_is_ignored() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        let (signed, ()) = tokio::join!(page.sign_message("once"), async {
            let shown = h.next_surface().await;
            h.sign_with(&shown, "0xfirst").await;
            h.sign_with(&shown, "0xsecond").await;
            h.decide(&shown, false).await;
        });
        assert_eq!(signed, Ok("0xfirst".to_string()));
        assert_eq!(h.host.pending().stats().total_approved.load(Ordering::Relaxed), 2);
        assert_eq!(h.host.pending().stats().total_rejected.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_foreign_extension_is_dropped() {
        let h = Harness::start();
        let foreign = h
            .host
            .port()
            .for_sender(SenderContext::extension_page("other-extension"));

        let result = foreign
            .send_message(RuntimePayload::Internal(InternalRequest::GetConnectedSites))
            .await;
        assert_eq!(result, Err(TransportError::ReplyDropped));
    }

    #[tokio::test]
    async fn test_flood_of_dropped_messages_leaves_host_serving() {
        let mut h = Harness::start();
        let page = h.open_tab(1, "https://dapp.example");
        h.connect(&page).await;

        let evil = h.host.content_port(9, "https://evil.example");
        for _ in 0..50 {
            let _ = evil
                .send_message(page_call(CallId::new(), "signMessage", "https://dapp.example"))
                .await;
        }

        assert!(tokio::time::timeout(Duration::from_secs(5), page.get_accounts())
            .await
            .unwrap()
            .is_ok());
        assert_eq!(h.host.pending().pending_count(), 0);
        assert!(h.presented.try_recv().is_err());
    }
}
