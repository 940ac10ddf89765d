//! # Shared Types Crate
//!
//! Ids, origins, entities, envelopes and the error taxonomy shared by the
//! page provider, the content relay and the wallet host.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a context boundary is
//!   defined here.
//! - **Separate Id Spaces**: page call ids, host correlation ids and surface
//!   ids are distinct types (see [`ids`]).
//! - **Transport Identity**: the [`SenderContext`] stamped by the transport is
//!   authoritative; payload fields never override it.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod ids;
pub mod ipc;
pub mod origin;

pub use entities::*;
pub use envelope::*;
pub use errors::*;
pub use ids::{CallId, CorrelationId, SurfaceId};
pub use ipc::*;
pub use origin::{Origin, OriginError};
