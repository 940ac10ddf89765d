//! Ports for the wallet host.

pub mod outbound;

pub use outbound::{
    AccountStore, CollaboratorResult, ContentStore, MessageSigner, NodeRegistry, SurfaceCloser,
    SurfaceHost,
};
