//! Simulated message signer.
//!
//! Not a real signature scheme: the "signature" is the SHA-256 of the
//! account address and the message, hex encoded with a `0x` prefix.

use crate::ports::outbound::{CollaboratorResult, MessageSigner};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use shared_types::Account;

/// Deterministic digest signer.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigestSigner;

impl DigestSigner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageSigner for DigestSigner {
    async fn sign(&self, account: &Account, message: &str) -> CollaboratorResult<String> {
        let mut hasher = Sha256::new();
        hasher.update(account.address.to_lowercase().as_bytes());
        hasher.update(b":");
        hasher.update(message.as_bytes());
        Ok(format!("0x{}", hex::encode(hasher.finalize())))
    }
}
