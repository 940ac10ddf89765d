//! Approval surface driver.
//!
//! Stands in for the wallet's approval window: renders each presented
//! surface on the terminal and answers it through the extension-internal
//! channel, exactly as the real popup would.

use bc_wallet_host::ports::outbound::SurfaceCloser;
use bc_wallet_host::{ChannelSurfaceHost, PresentedSurface};
use clap::ValueEnum;
use shared_bus::{MessageSender, RuntimePort};
use shared_types::{ApprovalKind, InternalRequest, RuntimePayload};
use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// What the user does with an approval window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Decision {
    Approve,
    Deny,
    /// Close the window without deciding.
    Dismiss,
}

/// How decisions are made.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Same decision every time.
    Fixed(Decision),
    /// Decisions in order; deny once exhausted.
    Script(VecDeque<Decision>),
    /// Ask on the terminal.
    Prompt,
}

impl Policy {
    async fn next(&mut self, shown: &PresentedSurface) -> Decision {
        match self {
            Policy::Fixed(decision) => *decision,
            Policy::Script(queue) => queue.pop_front().unwrap_or(Decision::Deny),
            Policy::Prompt => prompt(shown).await,
        }
    }
}

/// Drive presented surfaces until the host stops presenting.
pub async fn drive(
    mut presented: mpsc::UnboundedReceiver<PresentedSurface>,
    surfaces: Arc<ChannelSurfaceHost>,
    port: RuntimePort,
    mut policy: Policy,
) {
    while let Some(shown) = presented.recv().await {
        render(&shown);
        let decision = policy.next(&shown).await;
        println!("  → {:?}", decision);

        let spec = &shown.spec;
        let approved = match decision {
            Decision::Approve => true,
            Decision::Deny => false,
            Decision::Dismiss => {
                surfaces.close(shown.surface);
                continue;
            }
        };

        let message = match spec.kind {
            ApprovalKind::Connect => InternalRequest::ConnectionResponse {
                request_id: spec.request_id,
                approved,
                origin: Some(spec.origin.clone()),
            },
            // No signature supplied: the wallet signs with the current account.
            ApprovalKind::Sign => InternalRequest::SignatureResponse {
                request_id: spec.request_id,
                approved,
                signature: None,
            },
        };

        match port.send_message(RuntimePayload::Internal(message)).await {
            Ok(ack) => debug!(ack = ?ack, "Decision delivered"),
            Err(e) => warn!(error = %e, "Decision could not be delivered"),
        }
    }
}

fn render(shown: &PresentedSurface) {
    let spec = &shown.spec;
    println!(
        "┌ {} ({}×{}) {}",
        shown.surface, spec.width, spec.height, spec.route()
    );
    match spec.kind {
        ApprovalKind::Connect => println!("│ {} wants to connect to your wallet", spec.origin),
        ApprovalKind::Sign => println!(
            "│ {} asks you to sign: {:?}",
            spec.origin,
            spec.message.as_deref().unwrap_or_default()
        ),
    }
}

async fn prompt(shown: &PresentedSurface) -> Decision {
    let surface = shown.surface;
    let answer = tokio::task::spawn_blocking(move || {
        eprint!("└ [{surface}] approve (y) / deny (n) / close (c)? ");
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await;

    match answer {
        Ok(Ok(line)) => match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" | "approve" => Decision::Approve,
            "c" | "close" | "dismiss" => Decision::Dismiss,
            _ => Decision::Deny,
        },
        // Closed stdin reads as the window being closed.
        _ => Decision::Dismiss,
    }
}
