//! # Exploit Simulations
//!
//! Messages a hostile page or compromised content script could send. Each
//! must be dropped or ignored without affecting other callers.

pub mod forged_messages;
