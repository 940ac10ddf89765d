//! # Integration Tests
//!
//! Full page → content relay → wallet host round trips, with approval
//! windows answered through the extension-internal channel.

pub mod flows;
pub mod transport;
