//! # Block-Chain Wallet Runtime
//!
//! Wires the wallet host, per-tab content relays and the page provider into
//! one process, and stands in for the approval window on the terminal.
//!
//! ## Modules
//!
//! - `config` - file + environment configuration for host and provider
//! - `approver` - renders approval surfaces and sends the user's decision
//! - `wallet` - starts the host and opens tabs
//! - `demo` - scripted walkthrough and one-shot calls

pub mod approver;
pub mod config;
pub mod demo;
pub mod wallet;

pub use approver::{Decision, Policy};
pub use config::RuntimeConfig;
pub use wallet::Wallet;
