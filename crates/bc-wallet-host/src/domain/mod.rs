//! Domain types for the wallet host.
//!
//! Capability registry, pending approval table, approval lifecycle types,
//! method classification, configuration and errors.

pub mod approval;
pub mod capability;
pub mod config;
pub mod error;
pub mod methods;
pub mod pending;

// Re-exports for convenience
pub use approval::{Approval, ApprovalOutcome, ApprovalState, ApprovalTerminal, SurfaceSpec};
pub use capability::CapabilityRegistry;
pub use config::{ConfigError, HostConfig};
pub use error::{CollaboratorError, HostError};
pub use methods::{Method, StorageMethod};
pub use pending::{PendingApprovalTable, PendingStats};
