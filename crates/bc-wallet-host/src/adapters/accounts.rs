//! In-memory account store.
//!
//! Seeded with two test accounts. Nothing is persisted.

use crate::domain::error::CollaboratorError;
use crate::ports::outbound::{AccountStore, CollaboratorResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use rand::RngCore;
use shared_types::{default_accounts, Account};
use tracing::{debug, info};

struct AccountState {
    accounts: Vec<Account>,
    current_id: Option<String>,
    next_id: u64,
}

/// In-memory account store.
pub struct InMemoryAccountStore {
    state: RwLock<AccountState>,
}

impl InMemoryAccountStore {
    /// Store seeded with the default test accounts.
    pub fn new() -> Self {
        Self::with_accounts(default_accounts())
    }

    /// Store seeded with `accounts`; the first is current.
    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        let next_id = accounts
            .iter()
            .filter_map(|a| a.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let current_id = accounts.first().map(|a| a.id.clone());
        Self {
            state: RwLock::new(AccountState {
                accounts,
                current_id,
                next_id,
            }),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Random `0x`-prefixed 20-byte address.
fn random_address() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn list(&self) -> CollaboratorResult<Vec<Account>> {
        Ok(self.state.read().accounts.clone())
    }

    async fn current(&self) -> CollaboratorResult<Account> {
        let state = self.state.read();
        let selected = state
            .current_id
            .as_ref()
            .and_then(|id| state.accounts.iter().find(|a| &a.id == id));
        // Stale selection falls back to the first account.
        selected
            .or_else(|| state.accounts.first())
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound("no accounts".into()))
    }

    async fn set_current(&self, id: &str) -> CollaboratorResult<()> {
        let mut state = self.state.write();
        if !state.accounts.iter().any(|a| a.id == id) {
            return Err(CollaboratorError::NotFound(format!("account {id}")));
        }
        state.current_id = Some(id.to_string());
        debug!(account = id, "Current account changed");
        Ok(())
    }

    async fn add(&self, name: &str) -> CollaboratorResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CollaboratorError::Invalid("account name is required".into()));
        }

        let mut state = self.state.write();
        let account = Account::new(state.next_id.to_string(), name, random_address());
        state.next_id += 1;
        state.accounts.push(account.clone());
        state.current_id = Some(account.id.clone());

        info!(account = %account.id, address = %account.address, "Account created");
        Ok(account)
    }

    async fn update(&self, account: Account) -> CollaboratorResult<()> {
        let mut state = self.state.write();
        match state.accounts.iter_mut().find(|a| a.id == account.id) {
            Some(slot) => {
                *slot = account;
                Ok(())
            }
            None => Err(CollaboratorError::NotFound(format!("account {}", account.id))),
        }
    }

    async fn remove(&self, id: &str) -> CollaboratorResult<bool> {
        let mut state = self.state.write();
        let Some(index) = state.accounts.iter().position(|a| a.id == id) else {
            return Ok(false);
        };
        if state.accounts.len() == 1 {
            return Err(CollaboratorError::Refused("cannot remove the only account".into()));
        }

        state.accounts.remove(index);
        if state.current_id.as_deref() == Some(id) {
            state.current_id = state.accounts.first().map(|a| a.id.clone());
        }
        info!(account = id, "Account removed");
        Ok(true)
    }
}
