//! # Shared Bus - Transports Between Wallet Contexts
//!
//! In-memory models of the two channels a wallet call crosses between the
//! untrusted page and the privileged wallet host.
//!
//! ## Channels
//!
//! ```text
//! ┌──────────────┐   WindowChannel    ┌──────────────┐   runtime channel   ┌──────────────┐
//! │ Page         │ ←────────────────→ │ ContentRelay │ ──────────────────→ │ Wallet host  │
//! │ (untrusted)  │  broadcast, shared │ (per tab)    │  mpsc + one reply   │ (privileged) │
//! └──────────────┘                    └──────────────┘                     └──────────────┘
//! ```
//!
//! ## Security
//!
//! - **Transport Identity:** the runtime port stamps the `SenderContext`;
//!   pages never hold a port.
//! - **Shared Window:** any script may post on the window, so listeners drop
//!   frames they do not own.
//! - **Replay Guard:** a call id is dispatched at most once (see [`replay`]).

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod relay;
pub mod replay;
pub mod runtime;
pub mod window;

// Re-export main types
pub use relay::{ContentRelay, RelayStats};
pub use replay::{ReplayError, ReplayGuard};
pub use runtime::{
    runtime_channel, MessageSender, Responder, RuntimeEnvelope, RuntimeListener, RuntimePort,
    TransportError,
};
pub use window::{WindowChannel, WindowListener};

/// Maximum messages to buffer per window listener before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Default runtime channel depth.
pub const DEFAULT_RUNTIME_CAPACITY: usize = 256;
