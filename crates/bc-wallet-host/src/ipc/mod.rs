//! IPC module: the wallet host's end of the runtime channel.
//!
//! Page requests arrive through content relays; internal messages arrive
//! from the wallet's own UI. Both are verified in [`inbound`].

pub mod inbound;
pub mod internal;

pub use inbound::{InboundRelay, InboundStats};
pub use internal::InternalHandler;
