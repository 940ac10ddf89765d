//! # BC Page Provider - the untrusted side of the wallet bridge
//!
//! Code a page runs to talk to the wallet: [`ProviderClient`] correlates
//! calls with response frames on the page window, and [`BcExtension`] wraps
//! it in typed methods.
//!
//! ```text
//! page code ──→ BcExtension ──→ ProviderClient ──RequestFrame──→ window ──→ content relay
//!                                     ▲
//!                                     └──────────ResponseFrame── window ←── content relay
//! ```
//!
//! Call ids live only on this side; the wallet's approval ids never reach
//! the page.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod api;
pub mod client;

pub use api::BcExtension;
pub use client::{ClientStats, ProviderClient, ProviderConfig};
