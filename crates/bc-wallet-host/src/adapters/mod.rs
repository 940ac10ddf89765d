//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-memory implementations of the outbound ports. They simulate the
//! account store, storage network, signer and window system without any
//! real I/O.

pub mod accounts;
pub mod content;
pub mod nodes;
pub mod signer;
pub mod surface;

pub use accounts::InMemoryAccountStore;
pub use content::{content_id, SimulatedContentStore};
pub use nodes::InMemoryNodeRegistry;
pub use signer::DigestSigner;
pub use surface::{ChannelSurfaceHost, PresentedSurface};
