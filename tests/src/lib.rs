//! # Block-Chain Wallet Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # A started host, tabs and an approval driver
//! ├── integration/      # Page → relay → host flows
//! │   ├── flows.rs      # Connect, sign, dismissal, timeouts
//! │   └── transport.rs  # Shared window, missing host, dropped replies
//! │
//! └── exploits/         # Forged and replayed messages
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bc-tests
//!
//! # By category
//! cargo test -p bc-tests integration::
//! cargo test -p bc-tests exploits::
//!
//! # Benchmarks
//! cargo bench -p bc-tests
//! ```

#[cfg(test)]
pub mod fixtures;

pub mod exploits;
pub mod integration;
