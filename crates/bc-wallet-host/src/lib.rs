//! # BC Wallet Host - the privileged wallet context
//!
//! Receives page requests relayed from content scripts, authorizes them by
//! origin, gates sensitive ones behind user approval, and answers each
//! request exactly once.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          WALLET HOST                                │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  runtime channel ──→ InboundRelay (sender / origin / replay checks) │
//! │                            │                    │                   │
//! │                     page requests        internal messages          │
//! │                            ▼                    ▼                   │
//! │                      Dispatcher ◄──────── InternalHandler           │
//! │                     │          │                                    │
//! │        CapabilityRegistry    ApprovalController ──→ SurfaceHost     │
//! │                                    │                    │           │
//! │                          PendingApprovalTable ◄── SurfaceEvent      │
//! │                                                                     │
//! │  Collaborators: AccountStore · NodeRegistry · ContentStore · Signer │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Id Spaces
//!
//! - Page call ids (`CallId`) are chosen by the page and never reach the
//!   pending table.
//! - Approval ids (`CorrelationId`) are random and minted by the table.
//! - Surface ids (`SurfaceId`) are reserved before a surface is presented.
//!
//! # Security
//!
//! - The transport-stamped sender is authoritative; the envelope origin must
//!   match the sender tab's origin.
//! - Connect always asks the user; there is no silent approval.
//! - Every signature is approved individually, even for connected origins.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod dispatcher;
pub mod domain;
pub mod ipc;
pub mod ports;
pub mod service;
pub mod surface;

// Re-exports for public API
pub use adapters::{ChannelSurfaceHost, PresentedSurface};
pub use dispatcher::{Collaborators, Dispatcher};
pub use domain::config::HostConfig;
pub use domain::error::{CollaboratorError, HostError};
pub use domain::{CapabilityRegistry, PendingApprovalTable, SurfaceSpec};
pub use ipc::InboundRelay;
pub use service::WalletHost;
pub use surface::{ApprovalController, SurfaceEvent, SurfaceWatch};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
